use std::net::TcpListener;

use sqlx::postgres::PgPoolOptions;

use pipit::configuration::get_configuration;
use pipit::startup::run;
use pipit::store::Storage;
use pipit::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Structured logging first, so configuration failures are captured too
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let connection_string = configuration.database.connection_string();
    tracing::info!("Attempting to connect to database");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    tracing::info!("Database connection pool created successfully");

    let address = format!("127.0.0.1:{}", configuration.application.port);
    tracing::info!("Binding server to address: {}", address);

    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let storage = Storage::postgres(pool);

    let server = run(listener, storage, configuration)?;
    tracing::info!("Server started successfully");

    let _ = server.await;

    Ok(())
}
