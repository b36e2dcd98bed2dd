use clap::{Parser, Subcommand};
use p1_rs::logging::{log_error, log_warn};
use p1_rs::{
    connect_with_config, init_logger, read_capture, DecoderConfig, P1DeviceHandle, P1Error,
    SerialConfig, Telegram,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "p1-cli")]
#[command(about = "CLI tool for reading DSMR P1 smart-meter telegrams")]
struct Cli {
    /// Print decoded telegrams as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a number of telegrams from a serial device, then exit
    Read {
        device: String,
        #[arg(short, long, default_value = "115200")]
        baudrate: u32,
        #[arg(short, long, default_value = "1")]
        count: u32,
    },
    /// Read telegrams forever, logging and skipping failed ones
    Watch {
        device: String,
        #[arg(short, long, default_value = "115200")]
        baudrate: u32,
    },
    /// Decode telegrams replayed from a stored capture file
    Decode { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), P1Error> {
    init_logger();

    let cli = Cli::parse();
    match cli.command {
        Commands::Read {
            device,
            baudrate,
            count,
        } => {
            let mut handle = open(device, baudrate).await?;
            for _ in 0..count {
                let telegram = handle.read().await?;
                print_telegram(&telegram, cli.json)?;
            }
        }
        Commands::Watch { device, baudrate } => {
            let mut handle = open(device, baudrate).await?;
            loop {
                match handle.read().await {
                    Ok(telegram) => print_telegram(&telegram, cli.json)?,
                    Err(e @ P1Error::ChecksumMismatch { .. })
                    | Err(e @ P1Error::TelegramFormat(_)) => {
                        log_error(&format!("Discarding telegram: {e}"));
                    }
                    Err(P1Error::Timeout(window)) => {
                        log_warn(&format!("No line within {window:?}, retrying"));
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Commands::Decode { file } => {
            let telegrams = read_capture(&file, &DecoderConfig::default()).await?;
            for telegram in &telegrams {
                print_telegram(telegram, cli.json)?;
            }
        }
    }

    Ok(())
}

async fn open(device: String, baudrate: u32) -> Result<P1DeviceHandle, P1Error> {
    connect_with_config(SerialConfig {
        device,
        baudrate,
        ..SerialConfig::default()
    })
    .await
}

fn print_telegram(telegram: &Telegram, json: bool) -> Result<(), P1Error> {
    if json {
        let rendered =
            serde_json::to_string(telegram).map_err(|e| P1Error::Io(e.to_string()))?;
        println!("{rendered}");
    } else {
        print!("{telegram}");
    }
    Ok(())
}
