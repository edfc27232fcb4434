use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use editpop::config::load_popup_config;
use editpop::geometry::Anchor;
use editpop::i18n::DefaultTranslator;
use editpop::loader::{FsScriptFetcher, ScriptManifest, ToolkitLoader};
use editpop::scheduler::{FrameQueue, FrameScheduler};
use editpop::toolkit::{decode_image_source, CropZone, RasterToolkit, Transformation};
use editpop::ui::{HeaderButton, HeadlessHost, HeadlessMetrics};
use editpop::{ImageEditingPopup, PopupEvent, PopupEventKind, PopupOptions, PopupServices};
use image::GenericImageView;

/// Edit one image headlessly and print the saved result.
#[derive(Parser, Debug)]
#[command(name = "editpop", about = "Headless image crop/rotate through the editing popup")]
struct CliArgs {
    /// Image path or `data:` URL to edit.
    image: String,

    /// Rotate right instead of cropping to the configured ratio.
    #[arg(long)]
    rotate: bool,

    /// Directory the toolkit scripts from config.json are fetched from.
    #[arg(long, value_name = "DIR")]
    scripts_root: Option<PathBuf>,
}

fn main() -> Result<()> {
    editpop::logging::init();
    let args = CliArgs::parse();
    let config = load_popup_config();

    let queue = FrameQueue::new();
    let scheduler: Rc<dyn FrameScheduler> = Rc::new(queue.clone());

    // The raster toolkit is built in; scripts are only fetched when a root is given.
    let (root, manifest) = match &args.scripts_root {
        Some(root) => (root.clone(), config.manifest()),
        None => (PathBuf::from("."), ScriptManifest::new("", Vec::new())),
    };
    let loader = ToolkitLoader::new(
        Rc::new(FsScriptFetcher::new(root, scheduler.clone())),
        &manifest,
    );

    let popup = ImageEditingPopup::new(
        PopupServices {
            host: Rc::new(HeadlessHost::new(HeadlessMetrics::default())),
            toolkit: Rc::new(RasterToolkit::new(scheduler.clone())),
            loader,
            scheduler,
            translator: Rc::new(DefaultTranslator::english()),
        },
        PopupOptions::from_config(&config),
    );

    let outcome: Rc<RefCell<Option<PopupEvent>>> = Rc::new(RefCell::new(None));
    for kind in [PopupEventKind::SavedImage, PopupEventKind::LoadFailed] {
        let slot = outcome.clone();
        popup.subscribe(kind, move |event| *slot.borrow_mut() = Some(event.clone()));
    }

    popup.show(Some(Anchor::new(0.0)), Some(&args.image))?;
    queue.run_until_idle();
    if let Some(PopupEvent::LoadFailed { reason }) = outcome.borrow_mut().take() {
        bail!("image editor failed to load: {reason}");
    }

    let crop_ratio = config.crop_ratio();
    popup
        .with_surface(|surface| {
            if args.rotate {
                surface.apply(Transformation::RotateRight)
            } else {
                let zone = CropZone::centered(surface.bounds(), crop_ratio);
                surface.focus_crop(zone).map(|_| ())
            }
        })
        .context("editing surface never became ready")??;

    popup.press(HeaderButton::Save)?;
    queue.run_until_idle();

    let Some(PopupEvent::SavedImage { data_url }) = outcome.borrow_mut().take() else {
        bail!("nothing was saved");
    };
    let (width, height) = decode_image_source(&data_url)?.dimensions();
    println!(
        "saved {width}x{height} image as a data URL of {} bytes",
        data_url.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_image_and_flags() {
        let parsed = CliArgs::try_parse_from([
            "editpop",
            "photo.png",
            "--rotate",
            "--scripts-root",
            "static",
        ])
        .expect("args should parse");
        assert_eq!(parsed.image, "photo.png");
        assert!(parsed.rotate);
        assert_eq!(parsed.scripts_root, Some(PathBuf::from("static")));
    }

    #[test]
    fn rejects_missing_image_and_extra_arguments() {
        assert!(CliArgs::try_parse_from(["editpop"]).is_err());
        assert!(CliArgs::try_parse_from(["editpop", "a.png", "b.png"]).is_err());
        assert!(CliArgs::try_parse_from(["editpop", "a.png", "--scripts-root"]).is_err());
    }
}
