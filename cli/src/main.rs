// betadrop: BetaDrop command-line toolkit
//
// Device detection, OTA manifests and install links, upload checks, share
// tokens, backend access, and a local manifest server.

mod config;
mod server;

use anyhow::{Context, Result};
use betadrop_core::client::{ApiContext, SessionBus, UreqTransport};
use betadrop_core::store::SledStorage;
use betadrop_core::{
    detect_device, generate_ios_install_url, generate_manifest_plist, generate_short_token,
    is_valid_short_token, validate_file_with_limits, FileValidationResult, ManifestDescriptor,
    NavigatorHint,
};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "betadrop")]
#[command(about = "BetaDrop: Beta App Distribution Toolkit", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a user agent
    Detect {
        user_agent: String,
        /// navigator.maxTouchPoints reported by the browser
        #[arg(short, long)]
        touch_points: Option<u32>,
    },
    /// Build the itms-services install link for a manifest URL
    InstallUrl { manifest_url: String },
    /// Generate an OTA manifest plist
    Manifest {
        #[arg(long)]
        ipa_url: String,
        #[arg(long)]
        bundle_id: String,
        #[arg(long)]
        version: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        icon_url: Option<String>,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check whether a build file may be uploaded
    Validate {
        file: PathBuf,
        /// Size in bytes (read from disk when omitted)
        #[arg(short, long)]
        size: Option<u64>,
    },
    /// Generate share tokens
    Token {
        #[arg(short, long)]
        length: Option<usize>,
        #[arg(short, long, default_value = "1")]
        count: usize,
    },
    /// Check a share token's format
    CheckToken { token: String },
    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Talk to the backend API
    Api {
        #[command(subcommand)]
        action: ApiAction,
    },
    /// Serve manifests and utility endpoints over HTTP
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Set { key: String, value: String },
    Get { key: String },
    List,
}

#[derive(Subcommand)]
enum ApiAction {
    /// GET a path and print the envelope's data
    Get { path: String },
    /// Upload a build file
    Upload { file: PathBuf },
    /// End the backend session
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect {
            user_agent,
            touch_points,
        } => cmd_detect(user_agent, touch_points),
        Commands::InstallUrl { manifest_url } => cmd_install_url(manifest_url),
        Commands::Manifest {
            ipa_url,
            bundle_id,
            version,
            title,
            icon_url,
            output,
        } => {
            let descriptor = ManifestDescriptor {
                ipa_url,
                bundle_id,
                version,
                title,
                icon_url,
            };
            cmd_manifest(descriptor, output)
        }
        Commands::Validate { file, size } => cmd_validate(file, size),
        Commands::Token { length, count } => cmd_token(length, count),
        Commands::CheckToken { token } => cmd_check_token(token),
        Commands::Config { action } => cmd_config(action),
        Commands::Api { action } => {
            tokio::task::spawn_blocking(move || cmd_api(action))
                .await
                .context("API task panicked")?
        }
        Commands::Serve { port } => cmd_serve(port).await,
    }
}

fn cmd_detect(user_agent: String, touch_points: Option<u32>) -> Result<()> {
    let hint = NavigatorHint {
        max_touch_points: touch_points,
    };
    let info = detect_device(&user_agent, Some(&hint));

    let platform = info
        .platform()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "none".to_string());

    println!("{}", "Device".bold());
    println!("  Type:     {}", info.device_type.to_string().bright_cyan());
    println!("  Platform: {}", platform.bright_yellow());
    println!("  Mobile:   {}", info.is_mobile);

    Ok(())
}

fn cmd_install_url(manifest_url: String) -> Result<()> {
    println!("{}", generate_ios_install_url(&manifest_url));
    Ok(())
}

fn cmd_manifest(descriptor: ManifestDescriptor, output: Option<PathBuf>) -> Result<()> {
    let plist = generate_manifest_plist(&descriptor);

    match output {
        Some(path) => {
            std::fs::write(&path, plist).context("Failed to write manifest")?;
            println!("{} Manifest written to {}", "✓".green(), path.display());
        }
        None => print!("{}", plist),
    }

    Ok(())
}

fn cmd_validate(file: PathBuf, size: Option<u64>) -> Result<()> {
    let config = config::Config::load()?;

    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("File path has no usable file name")?;

    let file_size = match size {
        Some(size) => size,
        None => std::fs::metadata(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?
            .len(),
    };

    match validate_file_with_limits(file_name, file_size, &config.size_limits()) {
        FileValidationResult::Valid { platform } => {
            println!(
                "{} {} is a valid {} build",
                "✓".green(),
                file_name.bright_cyan(),
                platform
            );
            Ok(())
        }
        FileValidationResult::Invalid { error } => {
            println!("{} {}", "✗".red(), error);
            anyhow::bail!("Validation failed for {}", file_name)
        }
    }
}

fn cmd_token(length: Option<usize>, count: usize) -> Result<()> {
    let config = config::Config::load()?;
    let length = length.unwrap_or(config.token_length);

    for _ in 0..count {
        println!("{}", generate_short_token(length));
    }

    Ok(())
}

fn cmd_check_token(token: String) -> Result<()> {
    if is_valid_short_token(&token) {
        println!("{} {} is a valid share token", "✓".green(), token.bright_cyan());
        Ok(())
    } else {
        println!("{} {} is not a valid share token", "✗".red(), token);
        anyhow::bail!("Invalid token")
    }
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    let mut config = config::Config::load()?;

    match action {
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save()?;
            println!("{} Set {} = {}", "✓".green(), key.bright_cyan(), value);
        }

        ConfigAction::Get { key } => {
            if let Some(value) = config.get(&key) {
                println!("{} = {}", key.bright_cyan(), value);
            } else {
                anyhow::bail!("Unknown config key: {}", key);
            }
        }

        ConfigAction::List => {
            println!("{}", "Configuration".bold());
            println!();

            for (key, value) in config.list() {
                println!("  {:<22} {}", key.bright_cyan(), value);
            }
        }
    }

    Ok(())
}

fn cmd_api(action: ApiAction) -> Result<()> {
    let config = config::Config::load()?;
    let storage = SledStorage::open(config.storage_dir()?).context("Failed to open storage")?;
    let client_config = config.client_config();
    let transport = Arc::new(UreqTransport::new(client_config.request_timeout));
    let ctx = ApiContext::init(client_config, transport, &storage, &SessionBus::new())
        .context("Failed to initialize API context")?;

    match action {
        ApiAction::Get { path } => {
            let data: serde_json::Value = ctx.get(&path)?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }

        ApiAction::Upload { file } => {
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("File path has no usable file name")?
                .to_string();
            let data = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let result = ctx.upload_build(&file_name, data)?;
            println!("{} Uploaded {}", "✓".green(), file_name.bright_cyan());
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        ApiAction::Logout => {
            ctx.logout()?;
            println!("{} Logged out", "✓".green());
        }
    }

    ctx.dispose();
    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<()> {
    let config = config::Config::load()?;
    let port = port.unwrap_or(config.server.listen_port);

    let ctx = Arc::new(server::ServerContext {
        public_base_url: config.server.public_base_url.clone(),
        token_length: config.token_length,
        limits: config.size_limits(),
        start_time: std::time::Instant::now(),
    });

    println!("{}", "BetaDrop: Manifest Server".bold());
    println!();
    println!("  Listening:   {}", format!("0.0.0.0:{}", port).bright_cyan());
    println!("  Public URL:  {}", config.server.public_base_url.bright_yellow());
    println!();
    println!("{}", "Endpoints:".bold());
    println!("  {}  /manifest.plist?ipa_url=&bundle_id=&version=&title=", "GET ".bright_green());
    println!("  {}  /install?<same query>", "GET ".bright_green());
    println!("  {}  /api/device", "GET ".bright_green());
    println!("  {}  /api/validate", "POST".bright_green());
    println!("  {}  /api/token", "GET ".bright_green());
    println!();

    server::start(port, ctx).await;

    Ok(())
}
