use std::io::Write;

use env_logger::{Builder, Env};

/// Install the process-wide logger. `RUST_LOG` overrides the default `info` filter.
pub fn init() {
    let result = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();

    if let Err(e) = result {
        eprintln!("logger already initialised: {e}");
    }
}
