use anyhow::Result;
use clap::Parser;
use nimbus_core::{App, Config};
use nimbus_weather::{WeatherController, WeatherServices};

#[derive(Debug, Parser)]
#[command(author, version, about = "Current weather for where you are")]
struct Cli {
    /// Use the device's precise location after the initial lookup
    #[arg(long)]
    precise: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize core
    nimbus_core::init();

    let precise = cli.precise;

    let mut app = match App::new() {
        Ok(app) => app,
        Err(e) => {
            tracing::warn!("Falling back to default configuration: {}", e);
            eprintln!("{}", e.user_message());
            App::with_config(Config::default())
        }
    };

    tracing::info!("Nimbus started");

    let services = WeatherServices::from_config(app.config())?;
    let controller = WeatherController::new(services);

    controller.mount().await?;
    if precise {
        controller.request_precise_location().await;
    }

    let view = controller.view();
    println!("{}", view.render_summary());
    if let Some(notice) = &view.notice {
        println!("{}", notice);
    }
    if let Some(error) = &view.error {
        println!("{}", error);
    }
    if view.show_precise_button && !precise {
        println!("Run with --precise to use your device's location.");
    }

    // Graceful shutdown
    controller.teardown();
    app.shutdown();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_mount_only() {
        let cli = Cli::parse_from(["nimbus"]);
        assert!(!cli.precise);
    }

    #[test]
    fn test_precise_flag() {
        let cli = Cli::parse_from(["nimbus", "--precise"]);
        assert!(cli.precise);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = Cli::try_parse_from(["nimbus", "--precsie"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
