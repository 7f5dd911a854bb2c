mod assets;
mod cli;
mod infra;
mod report;
mod routes;
mod server;

use permit_dash::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
