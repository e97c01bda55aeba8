// src/main.rs

use backblast::{cli, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();
    if let Err(err) = run(args).await {
        eprintln!("backblast error: {err:?}");
        std::process::exit(1);
    }
}
