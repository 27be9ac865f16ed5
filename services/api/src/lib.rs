mod cli;
mod infra;
mod payroll;
mod routes;
mod server;

use fundraiser_payroll::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
