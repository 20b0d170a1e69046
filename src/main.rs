mod config;
mod export;
mod pipeline;
mod record;
mod utils;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use tracing::{debug, info, trace, warn};

use config::Settings;
use export::{AttachmentIndex, ExportDocument, ItemView};
use pipeline::{filter, process_item, Context};
use record::write_record;

#[derive(Parser)]
#[command(
    name = "wp-portfolio-mdx",
    about = "Convert a WordPress portfolio export into MDX content entries"
)]
struct Cli {
    /// WordPress WXR export file
    input: PathBuf,

    /// Content directory; one sub-directory per entry slug
    output_dir: PathBuf,

    /// Post type to convert
    #[arg(long, default_value = config::DEFAULT_POST_TYPE)]
    post_type: String,

    /// Post status to convert
    #[arg(long, default_value = config::DEFAULT_STATUS)]
    status: String,

    /// Taxonomy domain read into `category`
    #[arg(long, default_value = config::DEFAULT_CATEGORY_DOMAIN)]
    category_domain: String,

    /// Taxonomy domain read into `tags`
    #[arg(long, default_value = config::DEFAULT_TAG_DOMAIN)]
    tag_domain: String,

    /// File name written inside each entry directory
    #[arg(long, default_value = config::DEFAULT_FILE_NAME)]
    file_name: String,

    /// Run the whole pipeline but write nothing
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            post_type: self.post_type.clone(),
            status: self.status.clone(),
            category_domain: self.category_domain.clone(),
            tag_domain: self.tag_domain.clone(),
            file_name: self.file_name.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = cli.settings();

    let doc = ExportDocument::load(&cli.input)?;
    let items = doc.items();
    let attachments = AttachmentIndex::build(&items);
    info!(
        items = items.len(),
        attachments = attachments.len(),
        "Loaded export {}",
        cli.input.display()
    );

    let ctx = Context {
        settings: &settings,
        attachments: &attachments,
    };
    let counts = process_items(&items, &ctx, &cli.output_dir, cli.dry_run)?;
    counts.print(cli.dry_run);

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("Done in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

#[derive(Debug, Default)]
struct ProcessCounts {
    written: usize,
    skipped: usize,
    duplicates: usize,
}

impl ProcessCounts {
    fn print(&self, dry_run: bool) {
        let verb = if dry_run { "Would write" } else { "Wrote" };
        println!("Done. {} {} MDX files.", verb, self.written);
        if self.skipped > 0 || self.duplicates > 0 {
            println!(
                "Skipped {} items, {} duplicate slugs overwritten.",
                self.skipped, self.duplicates
            );
        }
    }
}

/// Sequential fold over the export in document order.
fn process_items(
    items: &[ItemView<'_>],
    ctx: &Context<'_>,
    output_dir: &Path,
    dry_run: bool,
) -> anyhow::Result<ProcessCounts> {
    use indicatif::{ProgressBar, ProgressStyle};

    let targets: Vec<&ItemView<'_>> = items
        .iter()
        .filter(|item| {
            let keep = filter::is_target(item, ctx.settings);
            if !keep {
                trace!(title = %item.title(), post_type = %item.post_type(), "filtered");
            }
            keep
        })
        .collect();
    info!("{} of {} items match post type {:?}", targets.len(), items.len(), ctx.settings.post_type);

    let pb = ProgressBar::new(targets.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let mut counts = ProcessCounts::default();
    let mut seen: HashSet<String> = HashSet::new();

    for item in targets {
        pb.inc(1);
        let record = match process_item(item, ctx) {
            Ok(record) => record,
            Err(skip) => {
                pb.suspend(|| warn!("Skipping item: {}", skip));
                counts.skipped += 1;
                continue;
            }
        };

        if !seen.insert(record.slug.clone()) {
            pb.suspend(|| warn!(slug = %record.slug, "Duplicate slug, later item overwrites the earlier one"));
            counts.duplicates += 1;
        }

        if dry_run {
            debug!(slug = %record.slug, date = %record.publish_date, "would write");
        } else {
            let path = write_record(output_dir, &record, &ctx.settings.file_name)?;
            debug!(path = %path.display(), "wrote");
        }
        counts.written += 1;
    }

    pb.finish_and_clear();
    Ok(counts)
}
