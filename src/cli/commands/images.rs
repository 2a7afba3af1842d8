use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::{load_config, output_success};
use crate::cli::OutputFormat;
use crate::images::ImageUrlNormalizer;

#[derive(Subcommand, Debug)]
pub enum ImagesCommands {
    #[command(about = "Show how an image_urls value would be stored")]
    Normalize {
        #[arg(help = "JSON value or raw string, e.g. '[\"/uploads/a.png\"]' or 'uploads/a.png, uploads/b.png'")]
        input: String,
        #[arg(long, help = "Override the configured base URL")]
        base_url: Option<String>,
    },
}

pub async fn handle(cmd: ImagesCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config()?;

    match cmd {
        ImagesCommands::Normalize { input, base_url } => {
            let normalizer = match base_url {
                Some(base) => ImageUrlNormalizer::with_base_url(base, config.images.blocklist.clone()),
                None => ImageUrlNormalizer::new(&config.images),
            };

            // Anything that is not valid JSON is taken as a raw string
            let raw = serde_json::from_str::<Value>(&input).unwrap_or(Value::String(input));
            let urls = normalizer.normalize(&raw);

            match output_format {
                OutputFormat::Text => {
                    for url in &urls {
                        println!("{}", url);
                    }
                    Ok(())
                }
                OutputFormat::Json => output_success(
                    &output_format,
                    &format!("{} image URLs", urls.len()),
                    Some(json!({ "image_urls": urls })),
                ),
            }
        }
    }
}
