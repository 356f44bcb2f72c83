use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;

mod cities;
mod cli;
mod diagram;
mod error;
mod logging;
mod output;
mod spacing;

use cities::City;
use cli::{Args, DepInfo};
use error::Error;
use output::{JsonRejection, JsonReport};
use spacing::CalculationInput;

// ===================== MAIN =====================

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_logging(&args.log_level);

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!("Fatal: {:?}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    if args.show_build_info {
        const DEP_INFO_RAW: &str = include_str!(env!("DEPS_INFO_PATH"));
        let deps: Vec<DepInfo> =
            serde_json::from_str(DEP_INFO_RAW).context("Corrupt embedded dependency list")?;
        output::print_build_info(env!("APP_GIT_HASH"), &deps);
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(query) = &args.search_city {
        let matches = cities::search(query);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&matches)?);
        } else {
            print!("{}", output::format_city_matches(&matches));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let city = resolve_city(args.city.as_deref())?;
    let latitude = match (args.latitude, city) {
        (Some(lat), _) => lat,
        (None, Some(c)) => c.latitude,
        (None, None) => bail!("either --latitude or --city is required"),
    };

    let input = CalculationInput::new(latitude, args.tilt, args.length)?;
    tracing::info!(latitude, tilt = args.tilt, length = args.length, "Calculating row spacing");

    let result = match spacing::evaluate(&input) {
        Ok(r) => r,
        Err(e @ Error::InvalidGeometry { solar_altitude }) => {
            tracing::warn!(solar_altitude, "Rejected calculation");
            if args.json {
                let body = JsonRejection { error: e.to_string() };
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                eprintln!("Error: {}", e);
            }
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(
        min_spacing = result.min_spacing,
        recommended_spacing = result.recommended_spacing,
        "Spacing computed"
    );

    // A failed diagram never invalidates the numeric result
    let rendered = if args.wants_diagram() { Some(diagram::render_result(&result)) } else { None };

    if let (Some(Ok(image)), Some(path)) = (&rendered, &args.output) {
        std::fs::write(path, image.as_png())
            .with_context(|| format!("Failed to write diagram to {}", path.display()))?;
        tracing::info!("Diagram ({}x{}) written to {}", image.width(), image.height(), path.display());
    }

    if args.json {
        let mut report = JsonReport::new(&result, city);
        match &rendered {
            Some(Ok(image)) if args.base64 => report.diagram_base64 = Some(image.to_base64()),
            Some(Ok(image)) if args.data_uri => report.diagram_data_uri = Some(image.to_data_uri()),
            Some(Err(e)) => report.diagram_error = Some(e.to_string()),
            _ => {}
        }
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_report(&result, city);
        match &rendered {
            Some(Ok(image)) => {
                if let Some(path) = &args.output {
                    println!("Diagram       : {}", path.display());
                }
                if args.base64 {
                    println!();
                    println!("{}", image.to_base64());
                } else if args.data_uri {
                    println!();
                    println!("{}", image.to_data_uri());
                }
            }
            Some(Err(_)) => println!("Diagram could not be generated"),
            None => {}
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn resolve_city(name: Option<&str>) -> anyhow::Result<Option<&'static City>> {
    let Some(name) = name else {
        return Ok(None);
    };
    match cities::find(name) {
        Some(c) => Ok(Some(c)),
        None => {
            let suggestions = cities::search(name);
            if suggestions.is_empty() {
                bail!("unknown city '{}'", name);
            }
            let names: Vec<&str> = suggestions.iter().map(|c| c.name).collect();
            bail!("unknown city '{}' (did you mean: {}?)", name, names.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_city() {
        assert!(resolve_city(None).unwrap().is_none());
        assert_eq!(resolve_city(Some("oslo")).unwrap().unwrap().latitude, 59.913);

        let err = resolve_city(Some("Vienn")).unwrap_err().to_string();
        assert!(err.contains("did you mean: Vienna"), "{}", err);

        let err = resolve_city(Some("Atlantis")).unwrap_err().to_string();
        assert_eq!(err, "unknown city 'Atlantis'");
    }
}
