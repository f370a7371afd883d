use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, ValueEnum};
use serde_json::Value as JsonValue;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use studyfilter::json::RecordDecoder;
use studyfilter::study::define_study_dimensions;
use studyfilter::{FilterState, FilterValue, FilterView, Predicate, RecordId};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "studyfilter")]
#[command(about = "Apply study list filters to a saved study list payload")]
struct Cli {
    /// JSON array of studies as returned by the study list endpoint
    input: PathBuf,

    /// Id of the signed-in user, for the my_study dimension
    #[arg(long)]
    user: Option<String>,

    /// Filter as KEY=VALUE, or KEY=V1,V2 for membership. `KEY=` matches nothing.
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    filter_args: Vec<String>,

    /// JSON filter map, e.g. {"status": ["ACTIVE"], "program": 3}
    #[arg(long = "filters", value_name = "FILE.json")]
    filter_map: Option<PathBuf>,

    /// Print the distinct values of this dimension with their type and count
    #[arg(long, value_name = "DIMENSION")]
    values: Option<String>,

    #[arg(long, value_enum, default_value_t = Format::Ids)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Ids,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    run(&cli, &mut stdout.lock())
}

fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let records = RecordDecoder::default()
        .read(&cli.input)
        .with_context(|| format!("failed to load studies from {}", cli.input.display()))?;

    let user = cli.user.as_deref().map(parse_user);
    let mut view = FilterView::new();
    define_study_dimensions(&mut view, user.as_ref());
    view.load(records)?;

    if let Some(dimension) = cli.values.as_deref() {
        for (value, count) in view.bucket_sizes(dimension)? {
            writeln!(out, "{}\t{}\t{}", value, value.type_name(), count)?;
        }
        return Ok(());
    }

    let mut state = match cli.filter_map.as_deref() {
        Some(path) => read_filter_file(path)?,
        None => FilterState::new(),
    };
    for arg in &cli.filter_args {
        let (dimension, predicate) = parse_filter_arg(arg)?;
        state.set_filter(dimension, Some(predicate));
    }

    let projection = view.recompute(&state);
    for name in projection.ignored() {
        eprintln!("warning: no dimension named '{}', filter ignored", name);
    }

    match cli.format {
        Format::Ids => {
            for id in projection.ids() {
                writeln!(out, "{}", id)?;
            }
        }
        Format::Json => writeln!(out, "{}", serde_json::to_string_pretty(&projection.to_json())?)?,
    }

    Ok(())
}

fn parse_user(token: &str) -> RecordId {
    token
        .parse::<i64>()
        .map(RecordId::Integer)
        .unwrap_or_else(|_| RecordId::from(token))
}

fn parse_filter_arg(arg: &str) -> Result<(String, Predicate)> {
    let (dimension, values) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("filter '{}' must look like KEY=VALUE", arg))?;
    if dimension.is_empty() {
        bail!("filter '{}' has no dimension name", arg);
    }

    let predicate = if values.is_empty() {
        Predicate::one_of(Vec::<FilterValue>::new())
    } else if values.contains(',') {
        Predicate::one_of(values.split(',').map(FilterValue::parse_literal))
    } else {
        Predicate::Equals(FilterValue::parse_literal(values))
    };

    Ok((dimension.to_string(), predicate))
}

fn read_filter_file(path: &Path) -> Result<FilterState> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read filter map {}", path.display()))?;
    let json: JsonValue = serde_json::from_str(&text)
        .with_context(|| format!("filter map {} is not valid JSON", path.display()))?;
    Ok(FilterState::from_json(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const STUDIES: &str = r#"[
        {"id": 1, "status": "ACTIVE", "legacy": false, "program": {"id": 10}, "owner": {"id": 7}},
        {"id": 2, "status": "COMPLETE", "legacy": true, "program": {"id": 20}, "owner": {"id": 8},
         "collaborator": {"id": 3}},
        {"id": 3, "status": "ACTIVE", "legacy": false, "program": {"id": 10}, "owner": {"id": 8}}
    ]"#;

    fn temp_json(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", text).unwrap();
        file
    }

    fn run_with(args: &[&str]) -> String {
        let cli = Cli::try_parse_from(args).unwrap();
        let mut out = Vec::new();
        run(&cli, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_read_filter_file() {
        let file = temp_json(r#"{"status": ["ACTIVE", "ON_HOLD"], "legacy": null}"#);
        let state = read_filter_file(file.path()).unwrap();
        assert_eq!(state.len(), 1);
        assert_eq!(state.get("status"), Some(&Predicate::one_of(["ACTIVE", "ON_HOLD"])));

        let broken = temp_json("{");
        assert!(read_filter_file(broken.path()).is_err());
        assert!(read_filter_file(Path::new("/nonexistent/filters.json")).is_err());
    }

    #[test]
    fn test_run_applies_filter_map_and_flags() {
        let input = temp_json(STUDIES);
        let filters = temp_json(r#"{"status": "ACTIVE"}"#);
        let output = run_with(&[
            "studyfilter",
            input.path().to_str().unwrap(),
            "--filters",
            filters.path().to_str().unwrap(),
            "--user",
            "8",
            "--filter",
            "my_study=true",
        ]);
        assert_eq!(output, "3\n");
    }

    #[test]
    fn test_run_prints_value_counts() {
        let input = temp_json(STUDIES);
        let output = run_with(&["studyfilter", input.path().to_str().unwrap(), "--values", "status"]);
        assert_eq!(output, "ACTIVE\tTEXT\t2\nCOMPLETE\tTEXT\t1\n");

        let output = run_with(&["studyfilter", input.path().to_str().unwrap(), "--values", "program"]);
        assert_eq!(output, "10\tINTEGER\t2\n20\tINTEGER\t1\n");
    }

    #[test]
    fn test_run_rejects_unknown_values_dimension() {
        let input = temp_json(STUDIES);
        let cli = Cli::try_parse_from(["studyfilter", input.path().to_str().unwrap(), "--values", "site"])
            .unwrap();
        assert!(run(&cli, &mut Vec::<u8>::new()).is_err());
    }

    #[test]
    fn test_parse_equality_filter() {
        let (dimension, predicate) = parse_filter_arg("program=3").unwrap();
        assert_eq!(dimension, "program");
        assert_eq!(predicate, Predicate::equals(3));
    }

    #[test]
    fn test_parse_membership_filter() {
        let (_, predicate) = parse_filter_arg("status=ACTIVE,null").unwrap();
        assert_eq!(
            predicate,
            Predicate::OneOf([FilterValue::Null, FilterValue::from("ACTIVE")].into())
        );
    }

    #[test]
    fn test_parse_empty_membership_filter() {
        let (_, predicate) = parse_filter_arg("status=").unwrap();
        assert_eq!(predicate, Predicate::one_of(Vec::<FilterValue>::new()));
    }

    #[test]
    fn test_parse_rejects_malformed_filters() {
        assert!(parse_filter_arg("status").is_err());
        assert!(parse_filter_arg("=ACTIVE").is_err());
    }

    #[test]
    fn test_parse_user() {
        assert_eq!(parse_user("12"), RecordId::Integer(12));
        assert_eq!(parse_user("jsmith"), RecordId::from("jsmith"));
    }
}
