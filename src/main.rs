#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use pullsecrets::{docker_config::DockerConfig, Credentials, Getter, TrackedImage};

#[derive(Serialize)]
struct Output<'a> {
    username: &'a str,
    password: &'a str,
    anonymous: bool,
}

fn print_credentials(credentials: &Credentials, show_password: bool) -> anyhow::Result<()> {
    let password = match (show_password, credentials.password.is_empty()) {
        (true, _) | (_, true) => credentials.password.as_str(),
        (false, false) => "<redacted>",
    };
    let output = Output {
        username: &credentials.username,
        password,
        anonymous: credentials.is_anonymous(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[derive(Clone, Parser)]
    #[clap(version)]
    struct Args {
        /// The tracing filter used for logs
        #[clap(long, env = "PULLSECRETS_LOG", default_value = "warn")]
        log_level: kubert::LogFilter,

        /// The logging format
        #[clap(long, default_value = "plain")]
        log_format: kubert::LogFormat,

        #[clap(flatten)]
        client: kubert::ClientArgs,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Clone, Subcommand)]
    enum Commands {
        /// Resolve registry credentials for an image running in a namespace.
        ///
        /// Declared secrets are tried first, then the pull secrets of pods
        /// running the same image. Prints anonymous credentials when nothing is found.
        Get {
            #[arg(long, short = 'n', env = "PULLSECRETS_NAMESPACE", default_value = "default")]
            namespace: String,

            #[arg(long)]
            image: String,

            /// Image pull secret to try before looking at running pods; repeatable
            #[arg(long = "secret")]
            secrets: Vec<String>,

            #[arg(long)]
            show_password: bool,
        },

        /// Decode a local dockercfg or config.json file.
        Decode {
            file: PathBuf,

            /// Registry host to pick; defaults to the first entry of the file
            #[arg(long)]
            registry: Option<String>,

            #[arg(long)]
            show_password: bool,
        },
    }

    let Args {
        log_level,
        log_format,
        client,
        command,
    } = Args::parse();

    log_format.try_init(log_level)?;

    match command {
        Commands::Get {
            namespace,
            image,
            secrets,
            show_password,
        } => {
            let tracked = TrackedImage::parse(&image, &namespace, secrets)?;
            let getter = Getter::new(client.try_client().await?);
            let credentials = getter.get(&tracked).await?;
            print_credentials(&credentials, show_password)?;
        }
        Commands::Decode {
            file,
            registry,
            show_password,
        } => {
            let payload = std::fs::read(&file)?;
            let credentials = match registry {
                Some(registry) => DockerConfig::from_slice(&payload)?.credentials(&registry)?,
                None => pullsecrets::docker_config::decode(&payload)?,
            };
            print_credentials(&credentials, show_password)?;
        }
    }

    Ok(())
}
