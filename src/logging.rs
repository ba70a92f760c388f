use std::io::Write;

use env_logger::{Builder, Env, Target};

/// Sets up the process-wide logger: stdout, `timestamp | LEVEL | message`,
/// `info` unless `RUST_LOG` says otherwise. Call once, before anything logs.
pub fn init() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} | {} | {}",
                buf.timestamp(),
                record.level(),
                record.args()
            )
        })
        .init();
}
