use anyhow::{bail, Context, Result};
use avatar_composer::assets::{ContentAssetLoader, GltfImporter};
use avatar_composer::avatar::{AvatarOrchestrator, AvatarRequest};
use avatar_composer::catalog::{BodyShape, EntityCatalog};
use avatar_composer::config::{load_settings, ComposerSettings};
use avatar_composer::content::{ContentService, HttpContentClient};
use avatar_composer::scene::HeadlessScene;
use avatar_composer::utils::logging::init_logging;
use avatar_composer::VERSION;
use std::env;
use std::sync::Arc;
use tracing::info;

struct CliArgs {
    content_server: String,
    body_shape: BodyShape,
    wearables: Vec<String>,
    emote: Option<String>,
    show: Vec<String>,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <content-server> <body:male|female> [urn...] [--emote URN] [--show CATEGORY]", program);
    eprintln!("Options:");
    eprintln!("  --emote URN       Play an emote on the composed avatar");
    eprintln!("  --show CATEGORY   Keep a category visible whatever the wearables hide (repeatable)");
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let content_server = args.get(1).context("missing content server URL")?.clone();
    let body_shape: BodyShape = args
        .get(2)
        .context("missing body shape")?
        .parse()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let mut wearables = Vec::new();
    let mut emote = None;
    let mut show = Vec::new();

    let mut rest = args.iter().skip(3);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--emote" => emote = Some(rest.next().context("--emote needs a URN")?.clone()),
            "--show" => show.push(rest.next().context("--show needs a category")?.clone()),
            flag if flag.starts_with("--") => bail!("unknown option {}", flag),
            urn => wearables.push(urn.to_string()),
        }
    }

    Ok(CliArgs { content_server, body_shape, wearables, emote, show })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        print_usage(args.first().map(String::as_str).unwrap_or("avatar-composer"));
        return Ok(());
    }
    let cli = parse_args(&args)?;

    init_logging();
    info!("🚀 Avatar Composer {}", VERSION);

    let settings = ComposerSettings {
        content_server: cli.content_server.clone(),
        ..load_settings().unwrap_or_default()
    };

    let content: Arc<dyn ContentService> = Arc::new(
        HttpContentClient::new(&settings.content_server, settings.request_timeout())
            .with_context(|| format!("Invalid content server {}", settings.content_server))?,
    );
    let catalog = Arc::new(EntityCatalog::new(Arc::clone(&content)));
    catalog
        .warm_up()
        .await
        .context("Content server does not serve the base body shapes")?;

    let loader = Arc::new(ContentAssetLoader::new(
        content,
        Arc::new(GltfImporter::new()),
        settings.texture,
    ));
    let mut orchestrator = AvatarOrchestrator::new(
        Arc::clone(&catalog),
        Arc::clone(&loader),
        HeadlessScene::new(),
        &settings,
    );

    let mut request = AvatarRequest::new(cli.body_shape)
        .with_wearables(cli.wearables)
        .with_force_visible(cli.show)
        .with_colors(settings.default_colors);
    request.emote = cli.emote;

    let report = orchestrator.load_avatar(request).await?;

    println!("Loaded:   {}", report.loaded.join(", "));
    if !report.skipped.is_empty() {
        println!("Skipped:  {}", report.skipped.join(", "));
    }
    println!(
        "Hidden:   {}",
        report.hidden_categories.iter().cloned().collect::<Vec<_>>().join(", ")
    );
    if let Some(emote) = orchestrator.state().loaded_emote_urn() {
        println!("Emote:    {} ({})", emote, orchestrator.state().animation.clip);
    }
    println!();
    print!("{}", orchestrator.scene().render_tree());

    let stats = catalog.stats().await;
    info!(
        "📊 Catalog: {} cached, {:.1}% hit ratio, {} dropped",
        catalog.cached_count().await,
        stats.hit_ratio(),
        stats.dropped
    );

    orchestrator.cleanup();
    info!("♻️ {} asset handles still live", loader.tracker().live());
    Ok(())
}
