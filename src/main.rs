//! certforge – command-line certificate renderer.
//!
//! Usage:
//!   certforge <template.png> [output.png] [--config cfg.json] [--record record.json]
//!             [--name "Jane Doe"] [--date 2025-01-05] [--logo logo.png]
//!             [--signature sig.png] [--pdf]
//!
//! If `output` is omitted the certificate is written next to the template
//! as `<stem>-certificate.png` (or `.pdf`).

use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

use chrono::NaiveDate;

use cert_forge::{
    CertificateFormat, CertificateRenderer, ParticipantContext, TemplateConfig, TemplateRecord,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut template_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut record_path: Option<PathBuf> = None;
    let mut logo_path: Option<PathBuf> = None;
    let mut signature_path: Option<PathBuf> = None;
    let mut name = String::new();
    let mut date: Option<String> = None;
    let mut format = CertificateFormat::Png;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1).peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--pdf" => format = CertificateFormat::Pdf,
            "--config" | "-c" => config_path = Some(PathBuf::from(value_for(arg, iter.next(), &args[0]))),
            "--record" | "-r" => record_path = Some(PathBuf::from(value_for(arg, iter.next(), &args[0]))),
            "--logo" => logo_path = Some(PathBuf::from(value_for(arg, iter.next(), &args[0]))),
            "--signature" => signature_path = Some(PathBuf::from(value_for(arg, iter.next(), &args[0]))),
            "--name" | "-n" => name = value_for(arg, iter.next(), &args[0]),
            "--date" | "-d" => date = Some(value_for(arg, iter.next(), &args[0])),
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    template_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    // A record carries its own background; otherwise a template path is required.
    let record = record_path.map(|p| match TemplateRecord::from_json(&read_text(&p)) {
        Ok(r) => r,
        Err(e) => fail(&format!("Error parsing record '{}': {e}", p.display())),
    });

    let (template_bytes, mut config, stem_source) = match (&record, &template_path) {
        (_, Some(path)) => {
            let config = record.as_ref().map(TemplateRecord::config).unwrap_or_default();
            (read_bytes(path), config, path.clone())
        }
        (Some(rec), None) => (rec.file.clone(), rec.config(), PathBuf::from(&rec.name)),
        (None, None) => {
            eprintln!("Error: no template image or record specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    if let Some(p) = config_path {
        config = match TemplateConfig::from_json(&read_text(&p)) {
            Ok(c) => c,
            Err(e) => fail(&format!("Error parsing config '{}': {e}", p.display())),
        };
    }
    if let Some(p) = logo_path {
        config.logo.show = true;
        config.logo.image = Some(read_bytes(&p));
    }
    if let Some(p) = signature_path {
        config.signature.show = true;
        config.signature.image = Some(read_bytes(&p));
    }

    let completion_date = match date {
        Some(d) => match NaiveDate::parse_from_str(&d, "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => fail(&format!("Invalid --date '{d}' (expected YYYY-MM-DD): {e}")),
        },
        None => chrono::Local::now().date_naive(),
    };
    let participant = ParticipantContext::new(name, completion_date).with_reference("cli");

    // Default output: template directory + stem, with the format's extension.
    let output = output_path.unwrap_or_else(|| {
        let stem = stem_source
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("certificate");
        stem_source.with_file_name(format.file_name(&format!("{stem}-certificate")))
    });

    let renderer = CertificateRenderer::default();
    let bytes = match renderer
        .render(&template_bytes, &config, &participant)
        .and_then(|png| format.encode(png, participant.resolved_name()))
    {
        Ok(b) => b,
        Err(e) => fail(&format!("Error rendering certificate: {e}")),
    };

    // Create output directory if necessary.
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                fail(&format!("Error creating output directory: {e}"));
            }
        }
    }
    if let Err(e) = fs::write(&output, &bytes) {
        fail(&format!("Error writing '{}': {e}", output.display()));
    }
    eprintln!(
        "Wrote '{}' ({} bytes, {})",
        output.display(),
        bytes.len(),
        format.content_type()
    );
}

fn value_for(flag: &str, value: Option<&String>, prog: &str) -> String {
    match value {
        Some(v) => v.clone(),
        None => {
            eprintln!("Missing value for {flag}");
            print_usage(prog);
            process::exit(1);
        }
    }
}

fn read_bytes(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap_or_else(|e| fail(&format!("Error reading '{}': {e}", path.display())))
}

fn read_text(path: &Path) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| fail(&format!("Error reading '{}': {e}", path.display())))
}

fn fail(msg: &str) -> ! {
    eprintln!("{msg}");
    process::exit(1);
}

fn print_usage(prog: &str) {
    eprintln!("certforge – certificate renderer (cert-forge)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <template.png> [output] [--name NAME] [--date YYYY-MM-DD] [--pdf]");
    eprintln!("  {prog} --record record.json [output] [--name NAME]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <template.png>  Background image (PNG or JPEG)");
    eprintln!("  [output]        Output path (default: <stem>-certificate.png next to the template)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --config, -c    Template config JSON (positions, sizes, colors)");
    eprintln!("  --record, -r    Stored template record JSON (background + settings)");
    eprintln!("  --name, -n      Participant name (default: \"Participant\")");
    eprintln!("  --date, -d      Completion date (default: today)");
    eprintln!("  --logo          Logo image; enables the logo layer");
    eprintln!("  --signature     Signature image; enables the signature layer");
    eprintln!("  --pdf           Write a single-page PDF instead of a PNG");
    eprintln!("  --help          Print this message");
}
