use std::io;

use playground_log::host::spawn_observed;
use playground_log::init::init_tracing;
use playground_log::{pipeline, Severity};

#[tokio::main]
async fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("{}", e);
    }

    let log = pipeline();
    log.log("booting playground", None);
    log.log("opfs is not available, falling back to memory", Severity::Warn);

    // Reported as an unhandled rejection.
    let _ = spawn_observed(async {
        Err(io::Error::new(io::ErrorKind::NotFound, "wp-config.php missing"))
    })
    .await;

    // Reported as an uncaught error, then by the default panic hook.
    let _ = std::panic::catch_unwind(|| {
        panic!("php worker crashed");
    });
}
