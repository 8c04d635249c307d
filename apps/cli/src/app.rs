//! Command handlers.

use std::sync::Arc;

use anyhow::Context;
use tusk_client::{ReqwestTransport, Upload, UploadOptions};
use tusk_store::FileUrlStore;
use tusk_transfer::{ByteSource, FileSource};

use crate::cli::UploadArgs;
use crate::config::Config;

/// Uploads one file and reports progress on stderr.
pub async fn upload(config: &Config, args: UploadArgs) -> anyhow::Result<()> {
    let options = upload_options(config, &args)?;

    let source = FileSource::open(&args.file)
        .await
        .with_context(|| format!("cannot open {}", args.file.display()))?;
    let options = match &source.info().name {
        Some(name) if !options.metadata.contains_key("filename") => {
            options.with_metadata("filename", name.as_str())
        }
        _ => options,
    };

    let (connect_timeout, request_timeout) = config.timeouts();
    let transport = ReqwestTransport::with_timeouts(connect_timeout, request_timeout)?;
    let store = FileUrlStore::open(config.store_path()?).await?;

    let options = options.on_progress(|sent, total| {
        let pct = if total == 0 { 100.0 } else { sent as f64 * 100.0 / total as f64 };
        eprint!("\r{sent}/{total} bytes ({pct:.1}%)");
    });

    let mut upload = Upload::new(
        Arc::new(source),
        options,
        Arc::new(transport),
        Arc::new(store),
    );

    let cancel = upload.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, aborting upload");
            cancel.cancel();
        }
    });

    let result = upload.start().await;
    eprintln!();
    result?;

    match upload.url() {
        Some(url) => println!("{url}"),
        None => tracing::warn!("upload finished without a URL"),
    }
    Ok(())
}

/// Prints every stored fingerprint and URL.
pub async fn list(config: &Config) -> anyhow::Result<()> {
    let store = FileUrlStore::open(config.store_path()?).await?;
    for (fingerprint, entry) in store.entries().await {
        println!("{}\t{}\t{}", entry.created_at.to_rfc3339(), entry.url, fingerprint);
    }
    Ok(())
}

/// Forgets every stored upload URL.
pub async fn clear(config: &Config) -> anyhow::Result<()> {
    let store = FileUrlStore::open(config.store_path()?).await?;
    let count = store.entries().await.len();
    store.clear().await?;
    tracing::info!(count, path = %store.path().display(), "cleared stored upload urls");
    Ok(())
}

/// Merges config values and flags into upload options.
fn upload_options(config: &Config, args: &UploadArgs) -> anyhow::Result<UploadOptions> {
    let endpoint = args
        .endpoint
        .clone()
        .or_else(|| config.endpoint.clone())
        .unwrap_or_default();
    if endpoint.is_empty() && args.upload_url.is_none() {
        anyhow::bail!("no endpoint configured; pass --endpoint or set `endpoint` in the config");
    }

    let mut options = UploadOptions::new(endpoint)
        .with_resume(config.resume && !args.no_resume)
        .with_remove_fingerprint_on_success(
            config.remove_fingerprint_on_success || args.forget_on_success,
        )
        .with_upload_length_deferred(args.defer_length)
        .with_override_patch_method(args.override_patch);

    if let Some(bytes) = args.chunk_size.or(config.chunk_size) {
        options = options.with_chunk_size(bytes);
    }
    if let Some(url) = &args.upload_url {
        options = options.with_upload_url(url.clone());
    }
    for (name, value) in config.headers.iter().map(|(k, v)| (k.clone(), v.clone())) {
        options = options.with_header(name, value);
    }
    for (name, value) in &args.headers {
        options = options.with_header(name.clone(), value.clone());
    }
    for (key, value) in &args.metadata {
        options = options.with_metadata(key.clone(), value.clone());
    }
    Ok(options)
}
