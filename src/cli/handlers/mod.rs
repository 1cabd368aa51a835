mod categories;
mod config;

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::warn;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::api::{ApiClient, ApiError};
use crate::io::config_io::{self, ConfigError};
use crate::model::config::AppConfig;
use crate::model::order::parse_backend_date;
use crate::model::resource::Resource;
use crate::ops::export::{self, ExportLayout, ExportOptions};
use crate::ops::listing::{self, ListQuery};

/// Resolved global flags and config for one invocation
pub struct Context {
    pub config: AppConfig,
    pub json: bool,
}

impl Context {
    pub fn load(config_path: &Path, json: bool, api_url: Option<String>) -> Result<Self, ConfigError> {
        let config = config_io::load_config(config_path, api_url)?;
        Ok(Context { config, json })
    }

    pub fn client(&self) -> Result<ApiClient, Box<dyn std::error::Error>> {
        ApiClient::new(&self.config.api).map_err(api_error)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_io::config_path(cli.config.as_deref());
    // Parsed only by commands that need it, so `config` can repair a broken file
    let load = || Context::load(&config_path, cli.json, cli.api_url.clone());

    match cli.command {
        None | Some(Commands::Tui) => Err("the TUI is started from main; use a subcommand".into()),
        Some(Commands::Categories(args)) => categories::cmd_categories(&load()?, args),

        // Generic resources
        Some(Commands::List(args)) => cmd_list(&load()?, args),
        Some(Commands::Show(args)) => cmd_show(&load()?, args),
        Some(Commands::Create(args)) => cmd_create(&load()?, args),
        Some(Commands::Update(args)) => cmd_update(&load()?, args),
        Some(Commands::Delete(args)) => cmd_delete(&load()?, args),

        Some(Commands::Export(args)) => match args.action {
            ExportAction::Orders(a) => cmd_export_orders(&load()?, a),
        },
        Some(Commands::Config(args)) => {
            config::cmd_config(&config_path, cli.json, cli.api_url.clone(), args)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Convert an API error to user-facing text, with a hint for expired sessions
pub fn api_error(e: ApiError) -> Box<dyn std::error::Error> {
    warn!(error = %e, "command failed");
    if e.is_auth() {
        format!(
            "{}\nsession expired or missing: update the token with `bka config set api.token <cookie>`",
            e
        )
        .into()
    } else {
        Box::new(e)
    }
}

fn parse_resource(name: &str) -> Result<Resource, Box<dyn std::error::Error>> {
    Ok(name.parse::<Resource>()?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse the `--data` / `--file` body; it must be a JSON object
fn read_body(args: &BodyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let text = match (&args.data, &args.file) {
        (Some(data), _) => data.clone(),
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?,
        (None, None) => return Err("provide --data or --file".into()),
    };
    let value: Value =
        serde_json::from_str(&text).map_err(|e| format!("invalid JSON body: {}", e))?;
    if !value.is_object() {
        return Err("JSON body must be an object".into());
    }
    Ok(value)
}

fn parse_date_arg(flag: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, Box<dyn std::error::Error>> {
    let Some(s) = raw else {
        return Ok(None);
    };
    parse_backend_date(s)
        .map(Some)
        .ok_or_else(|| format!("invalid {} date '{}' (expected YYYY-MM-DD)", flag, s).into())
}

fn print_record(ctx: &Context, record: &Value) -> Result<(), Box<dyn std::error::Error>> {
    if ctx.json {
        return print_json(record);
    }
    for line in format_record_detail(record) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Generic resources
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let resource = parse_resource(&args.resource)?;
    let records = ctx.client()?.list(resource).map_err(api_error)?;

    let query = ListQuery {
        search: args.search,
        status: args.status,
        sort_by: args.sort,
        descending: args.desc,
        page: args.page,
        per_page: args.per_page.unwrap_or(ctx.config.list.per_page),
    };
    let page = listing::apply(&records, &query)?;

    if ctx.json {
        return print_json(&page);
    }
    if page.items.is_empty() {
        println!("no {} found", resource);
        return Ok(());
    }
    let columns = pick_columns(&page.items, resource.list_columns());
    for line in format_table(&page.items, &columns) {
        println!("{}", line);
    }
    println!();
    println!("{}", format_page_footer(&page));
    Ok(())
}

fn cmd_show(ctx: &Context, args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let resource = parse_resource(&args.resource)?;
    let record = ctx.client()?.show(resource, &args.id).map_err(api_error)?;
    print_record(ctx, &record)
}

fn cmd_create(ctx: &Context, args: CreateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let resource = parse_resource(&args.resource)?;
    let body = read_body(&args.body)?;
    let created = ctx.client()?.create(resource, &body).map_err(api_error)?;
    if ctx.json {
        return print_json(&created);
    }
    match created.get("id") {
        Some(id) => println!("created {} {}", resource, format_value(id)),
        None => println!("created {}", resource),
    }
    Ok(())
}

fn cmd_update(ctx: &Context, args: UpdateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let resource = parse_resource(&args.resource)?;
    let body = read_body(&args.body)?;
    let updated = ctx
        .client()?
        .update(resource, &args.id, &body)
        .map_err(api_error)?;
    if ctx.json {
        return print_json(&updated);
    }
    println!("updated {} {}", resource, args.id);
    Ok(())
}

fn cmd_delete(ctx: &Context, args: DeleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let resource = parse_resource(&args.resource)?;
    if !args.yes {
        return Err(format!(
            "refusing to delete {} {} without --yes",
            resource, args.id
        )
        .into());
    }
    ctx.client()?.remove(resource, &args.id).map_err(api_error)?;
    if ctx.json {
        return print_json(&serde_json::json!({ "deleted": args.id, "resource": resource }));
    }
    println!("deleted {} {}", resource, args.id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

fn cmd_export_orders(ctx: &Context, args: ExportOrdersArgs) -> Result<(), Box<dyn std::error::Error>> {
    let layout: ExportLayout = args.layout.parse()?;
    let opts = ExportOptions {
        layout,
        status: args.status,
        from: parse_date_arg("--from", args.from.as_deref())?,
        to: parse_date_arg("--to", args.to.as_deref())?,
        delimiter: ctx.config.export.delimiter,
        bom: ctx.config.export.bom,
    };
    let orders = ctx.client()?.orders().map_err(api_error)?;

    match args.output {
        Some(path) => {
            let rows = export::export_to_path(&orders, &opts, &path)?;
            if ctx.json {
                return print_json(&ExportJson {
                    rows,
                    path: Some(path.display().to_string()),
                });
            }
            eprintln!("wrote {} rows to {}", rows, path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let rows = export::write_orders(&orders, &opts, stdout.lock())?;
            eprintln!("{} rows", rows);
        }
    }
    Ok(())
}
