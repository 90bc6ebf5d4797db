//! Formsmith CLI: build, list, preview, fill and delete form templates.

use std::env;
use std::path::PathBuf;
use std::process;

use colored::Colorize;

use formsmith::builder::Builder;
use formsmith::fill::fill_form;
use formsmith::render::render_field;
use formsmith::repository::{HttpTemplateRepository, TemplateRepository};
use formsmith::schema::factory::FieldFactory;
use formsmith::schema::FormSchema;
use formsmith::tui;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DRAFT_FILE: &str = ".formsmith_draft.json";

/// CLI command to execute.
enum Command {
    /// Open the builder on a new or existing template
    Edit { id: Option<String>, draft: bool },
    /// List template summaries
    List,
    /// Print a template's read-only rendering
    Show { id: String },
    /// Delete a persisted template
    Delete { id: String },
    /// Fill out a template interactively
    Fill { id: String, submit: bool },
}

/// CLI options parsed from arguments.
struct Options {
    command: Command,
    server: Option<String>,
    title: Option<String>,
}

fn print_usage() {
    eprintln!("Formsmith {} - form template builder", VERSION);
    eprintln!();
    eprintln!("Usage: formsmith [command] [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  edit [id]        Open the builder (default; new template without an id)");
    eprintln!("  edit --draft     Resume the locally saved draft");
    eprintln!("  list             List persisted templates");
    eprintln!("  show <id>        Print a template's read-only preview");
    eprintln!("  fill <id>        Fill out a template on the terminal");
    eprintln!("  delete <id>      Delete a persisted template");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --server URL    Template backend (or FORMSMITH_SERVER env var)");
    eprintln!("  --title TITLE   Title for a new template");
    eprintln!("  --submit        POST the filled form back to the backend (fill only)");
    eprintln!("  --help, -h      Show this help message");
    eprintln!("  --version       Show the version");
    eprintln!();
    eprintln!("The api key is read from FORMSMITH_API_KEY when set.");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  formsmith                           Build a new template offline");
    eprintln!("  formsmith --server api.example.com  Build and save to a backend");
    eprintln!("  formsmith edit 42                   Edit template 42");
    eprintln!("  formsmith fill 42 --submit          Fill template 42 and submit");
}

fn parse_args() -> Options {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut options = Options {
        command: Command::Edit {
            id: None,
            draft: false,
        },
        server: None,
        title: None,
    };

    let mut positional: Vec<String> = Vec::new();
    let mut draft = false;
    let mut submit = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--version" => {
                println!("formsmith {}", VERSION);
                process::exit(0);
            }
            "--server" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("--server requires a URL");
                    print_usage();
                    process::exit(64);
                }
                options.server = Some(args[i].clone());
            }
            "--title" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("--title requires a value");
                    print_usage();
                    process::exit(64);
                }
                options.title = Some(args[i].clone());
            }
            "--draft" => draft = true,
            "--submit" => submit = true,
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                print_usage();
                process::exit(64);
            }
            _ => positional.push(args[i].clone()),
        }
        i += 1;
    }

    let require_id = |positional: &[String], name: &str| -> String {
        match positional.get(1) {
            Some(id) => id.clone(),
            None => {
                eprintln!("{} requires a template id", name);
                print_usage();
                process::exit(64);
            }
        }
    };

    options.command = match positional.first().map(|s| s.as_str()) {
        None => Command::Edit { id: None, draft },
        Some("edit") => Command::Edit {
            id: positional.get(1).cloned(),
            draft,
        },
        Some("list") => Command::List,
        Some("show") => Command::Show {
            id: require_id(&positional, "show"),
        },
        Some("delete") => Command::Delete {
            id: require_id(&positional, "delete"),
        },
        Some("fill") => Command::Fill {
            id: require_id(&positional, "fill"),
            submit,
        },
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            process::exit(64);
        }
    };

    options
}

fn repository(server: &Option<String>) -> Option<HttpTemplateRepository> {
    let host = server
        .clone()
        .or_else(|| env::var("FORMSMITH_SERVER").ok())?;
    let mut repo = HttpTemplateRepository::connect(&host);
    if let Ok(api_key) = env::var("FORMSMITH_API_KEY") {
        repo = repo.with_api_key(&api_key);
    }
    Some(repo)
}

fn require_repository(server: &Option<String>) -> HttpTemplateRepository {
    match repository(server) {
        Some(repo) => repo,
        None => {
            eprintln!(
                "{}",
                "No backend configured. Pass --server or set FORMSMITH_SERVER.".red()
            );
            process::exit(1);
        }
    }
}

fn draft_path() -> PathBuf {
    if let Some(home) = dirs::home_dir() {
        home.join(DRAFT_FILE)
    } else {
        PathBuf::from(DRAFT_FILE)
    }
}

fn main() {
    let options = parse_args();

    match options.command {
        Command::Edit { id, draft } => run_edit(id, draft, &options.server, options.title),
        Command::List => run_list(&options.server),
        Command::Show { id } => run_show(&id, &options.server),
        Command::Delete { id } => run_delete(&id, &options.server),
        Command::Fill { id, submit } => run_fill(&id, submit, &options.server),
    }
}

fn run_edit(id: Option<String>, draft: bool, server: &Option<String>, title: Option<String>) {
    let repo = repository(server);

    let builder = if let Some(id) = id {
        let repo = match &repo {
            Some(repo) => repo,
            None => {
                eprintln!(
                    "{}",
                    "Editing a stored template needs a backend (--server).".red()
                );
                process::exit(1);
            }
        };
        match repo.show(&id) {
            Ok(template) => Builder::from_template(template),
            Err(err) => {
                eprintln!("{} {}", "Could not load template:".red(), err);
                process::exit(1);
            }
        }
    } else if draft {
        match Builder::load_draft(&draft_path()) {
            Ok(builder) => builder,
            Err(err) => {
                eprintln!("{} {}", "Could not load draft:".red(), err);
                process::exit(1);
            }
        }
    } else {
        Builder::new(title.unwrap_or_else(|| "Untitled Form".to_string()))
    };

    let repo: Option<Box<dyn TemplateRepository>> =
        repo.map(|r| Box::new(r) as Box<dyn TemplateRepository>);
    if let Err(err) = tui::run_builder(builder, repo, draft_path()) {
        eprintln!("{} {}", "Builder failed:".red(), err);
        process::exit(1);
    }
}

fn run_list(server: &Option<String>) {
    let repo = require_repository(server);
    match repo.list() {
        Ok(summaries) => {
            if summaries.is_empty() {
                println!("No templates yet.");
                return;
            }
            let header = format!(
                "{:<10} {:<32} {:>11}  {}",
                "ID", "TITLE", "SUBMISSIONS", "LAST USED"
            );
            println!("{}", header.bold());
            for summary in summaries {
                println!(
                    "{:<10} {:<32} {:>11}  {}",
                    summary.id,
                    summary.title,
                    summary.submissions_count,
                    format_last_used(summary.last_used.as_deref())
                );
            }
        }
        Err(err) => {
            eprintln!("{} {}", "Could not list templates:".red(), err);
            process::exit(1);
        }
    }
}

fn format_last_used(last_used: Option<&str>) -> String {
    match last_used {
        None => "never".dimmed().to_string(),
        Some(raw) => match chrono::DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => ts.format("%Y-%m-%d").to_string(),
            Err(_) => raw.to_string(),
        },
    }
}

fn run_show(id: &str, server: &Option<String>) {
    let repo = require_repository(server);
    match repo.show(id) {
        Ok(template) => {
            let mut factory = FieldFactory::new();
            let schema = FormSchema::from_wire(template.title, template.fields, &mut factory);
            println!();
            println!("{}", schema.title.bold());
            println!();
            if schema.fields.is_empty() {
                println!("{}", "(no fields)".dimmed());
            }
            for field in &schema.fields {
                for line in render_field(field, false) {
                    println!("  {}", line);
                }
                println!();
            }
        }
        Err(err) => {
            eprintln!("{} {}", "Could not load template:".red(), err);
            process::exit(1);
        }
    }
}

fn run_delete(id: &str, server: &Option<String>) {
    let repo = require_repository(server);
    match repo.delete(id) {
        Ok(()) => println!("{} {}", "Deleted template".green(), id),
        Err(err) => {
            eprintln!("{} {}", "Could not delete template:".red(), err);
            process::exit(1);
        }
    }
}

fn run_fill(id: &str, submit: bool, server: &Option<String>) {
    let repo = require_repository(server);
    let template = match repo.show(id) {
        Ok(template) => template,
        Err(err) => {
            eprintln!("{} {}", "Could not load template:".red(), err);
            process::exit(1);
        }
    };

    let mut factory = FieldFactory::new();
    let schema = FormSchema::from_wire(template.title, template.fields, &mut factory);

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let submission = match fill_form(&schema, &mut input) {
        Ok(submission) => submission,
        Err(err) => {
            eprintln!("{} {}", "Fill aborted:".red(), err);
            process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&submission) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            eprintln!("{} {}", "Could not encode submission:".red(), err);
            process::exit(1);
        }
    }

    if submit {
        match repo.submit(id, &submission) {
            Ok(()) => println!("{}", "Submission sent.".green()),
            Err(err) => {
                eprintln!("{} {}", "Could not submit:".red(), err);
                process::exit(1);
            }
        }
    }
}
