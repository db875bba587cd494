use osteoage::config::load_roi_tool_config;
use osteoage::image::io::{load_grayscale, save_grayscale, write_json_file};
use osteoage::roi::{extract_roi, RoiOutcome};
use osteoage::standardize::{standardize, Criteria};
use serde::Serialize;
use std::env;
use std::path::Path;

#[derive(Serialize)]
struct RoiToolSummary {
    input_width: usize,
    input_height: usize,
    standardized: bool,
    roi_status: &'static str,
    roi_width: Option<usize>,
    roi_height: Option<usize>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_roi_tool_config(Path::new(&config_path))?;

    let gray = load_grayscale(&config.input).map_err(|e| e.to_string())?;
    let (input_w, input_h) = (gray.w, gray.h);

    let standardized = config.criteria.is_some();
    let working = match &config.criteria {
        Some(criteria_path) => {
            let criteria = Criteria::from_json_path(criteria_path).map_err(|e| e.to_string())?;
            standardize(&gray, &criteria)
        }
        None => gray,
    };
    if standardized {
        if let Some(path) = &config.output.standardized_image {
            save_grayscale(&working, path)?;
            println!("Saved standardized image to {}", path.display());
        }
    }

    let outcome = extract_roi(&working, &config.roi);
    let (roi_width, roi_height) = match &outcome {
        RoiOutcome::Extracted(crop) => {
            if let Some(path) = &config.output.roi_image {
                save_grayscale(crop, path)?;
                println!("Saved ROI crop to {}", path.display());
            }
            (Some(crop.w), Some(crop.h))
        }
        _ => {
            println!("ROI extraction skipped: {}", outcome.reason());
            (None, None)
        }
    };

    let summary = RoiToolSummary {
        input_width: input_w,
        input_height: input_h,
        standardized,
        roi_status: outcome.reason(),
        roi_width,
        roi_height,
    };
    if let Some(path) = &config.output.summary_json {
        write_json_file(path, &summary)?;
        println!("Saved summary to {}", path.display());
    }

    Ok(())
}

fn usage() -> String {
    "Usage: roi_tool <config.json>".to_string()
}
