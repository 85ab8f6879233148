// src/main.rs

use envlaunch::{cli, logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = match run_main().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("envlaunch error: {err}");
            err.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run_main() -> envlaunch::errors::Result<i32> {
    let args = cli::parse()?;
    logging::init_logging(args.log_level)?;
    run(args).await
}
