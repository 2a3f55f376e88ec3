use std::time::Instant;

use playground_log::config::PipelineConfig;
use playground_log::global::init_global;
use playground_log::Severity;

fn main() {
    let path = std::env::temp_dir().join("playground-debug.log");
    let dsn = format!("file://{}", path.display());

    let config = match PipelineConfig::from_dsn(&dsn) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("bad dsn {}: {}", dsn, e);
            return;
        }
    };
    let log = match init_global(config) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };

    let n: u64 = 10_000;
    let start = Instant::now();
    for i in 0..n {
        log.log(&format!("request {} served", i), Severity::Debug);
    }
    log.flush();

    let elapsed = start.elapsed();
    println!(
        "wrote {} lines to {} in {:?} (~{:.0} lines/s)",
        n,
        path.display(),
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
