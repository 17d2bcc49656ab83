//! Command-line front end over `taskdeck_core`.
//!
//! # Responsibility
//! - Open the configured state database, run one command, flush, exit.
//! - Keep output line-oriented and deterministic for scripting.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use taskdeck_core::{
    core_version, init_logging, AppConfig, AppContext, Category, NewTodo, ProfilePatch,
    RepeatConfig, StatusFilter, TagColor, Todo, TodoFilter, TodoPatch, Weekday,
};

#[derive(Debug, Parser)]
#[command(name = "taskdeck", version, about = "Personal task tracker")]
struct Cli {
    /// State database path.
    #[arg(long, global = true, env = "TASKDECK_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage tasks.
    #[command(subcommand)]
    Todos(TodoCommand),
    /// Manage categories.
    #[command(subcommand)]
    Categories(CategoryCommand),
    /// Show or edit the profile.
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Unlock with the PIN.
    Login { pin: String },
    /// Lock again.
    Logout,
    /// Show or change the theme preference.
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeMode>,
    },
    /// Print the core version.
    Version,
}

#[derive(Debug, Subcommand)]
enum TodoCommand {
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_enum, default_value_t = StatusArg::All)]
        status: StatusArg,
        #[arg(long)]
        search: Option<String>,
    },
    Add(AddTodoArgs),
    Edit(EditTodoArgs),
    Toggle { id: String },
    Delete { id: String },
    Stats,
}

#[derive(Debug, Args)]
struct AddTodoArgs {
    title: String,
    #[arg(long)]
    category: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Due date in Unix epoch milliseconds.
    #[arg(long)]
    due: Option<i64>,
    /// Comma-separated repeat days, e.g. `mon,wed,fri`.
    #[arg(long, value_delimiter = ',')]
    repeat: Vec<String>,
}

#[derive(Debug, Args)]
struct EditTodoArgs {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    due: Option<i64>,
    #[arg(long, conflicts_with = "due")]
    clear_due: bool,
}

#[derive(Debug, Subcommand)]
enum CategoryCommand {
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Add { name: String },
    Rename { id: String, name: String },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
enum ProfileCommand {
    Show,
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
        #[arg(long)]
        about: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        tag_color: Option<String>,
    },
    Reset,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    All,
    Active,
    Completed,
}

impl From<StatusArg> for StatusFilter {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::All => StatusFilter::All,
            StatusArg::Active => StatusFilter::Active,
            StatusArg::Completed => StatusFilter::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeMode {
    Toggle,
    Dark,
    Light,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("taskdeck: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Command::Version = cli.command {
        println!("taskdeck_core version={}", core_version());
        return Ok(());
    }

    let mut config = AppConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir)?;
    }

    let ctx = AppContext::open(&config).map_err(|err| err.to_string())?;
    execute(&ctx, cli.command)?;
    ctx.flush().map_err(|err| format!("changes may not be saved: {err}"))
}

fn execute(ctx: &AppContext, command: Command) -> Result<(), String> {
    match command {
        Command::Todos(command) => execute_todo(ctx, command),
        Command::Categories(command) => execute_category(ctx, command),
        Command::Profile(command) => execute_profile(ctx, command),
        Command::Login { pin } => {
            if ctx.auth().validate_pin(&pin) {
                println!("unlocked");
                Ok(())
            } else {
                Err("incorrect PIN".to_string())
            }
        }
        Command::Logout => {
            ctx.auth().logout();
            println!("locked");
            Ok(())
        }
        Command::Theme { mode } => {
            require_unlocked(ctx)?;
            let dark = match mode {
                None => ctx.theme().is_dark_mode(),
                Some(ThemeMode::Toggle) => ctx.theme().toggle_dark_mode(),
                Some(ThemeMode::Dark) => {
                    ctx.theme().set_dark_mode(true);
                    true
                }
                Some(ThemeMode::Light) => {
                    ctx.theme().set_dark_mode(false);
                    false
                }
            };
            println!("theme={}", if dark { "dark" } else { "light" });
            Ok(())
        }
        Command::Version => Ok(()),
    }
}

fn execute_todo(ctx: &AppContext, command: TodoCommand) -> Result<(), String> {
    require_unlocked(ctx)?;
    match command {
        TodoCommand::List {
            category,
            status,
            search,
        } => {
            let filter = TodoFilter {
                status: status.into(),
                category_id: category,
                text: search,
            };
            for todo in ctx.todos().filter_todos(&filter) {
                print_todo(&todo);
            }
        }
        TodoCommand::Add(args) => {
            if args.title.trim().is_empty() {
                return Err("title is required".to_string());
            }
            if ctx.categories().get_category_by_id(&args.category).is_none() {
                return Err(format!("unknown category `{}`", args.category));
            }
            let mut input = NewTodo::new(args.title.trim(), args.category)
                .with_description(args.description.trim());
            if let Some(due) = args.due {
                input = input.with_due_date(due);
            }
            if !args.repeat.is_empty() {
                input = input.with_repeat(parse_repeat(&args.repeat)?);
            }
            print_todo(&ctx.todos().add_todo(input));
        }
        TodoCommand::Edit(args) => {
            if let Some(category) = &args.category {
                if ctx.categories().get_category_by_id(category).is_none() {
                    return Err(format!("unknown category `{category}`"));
                }
            }
            let title = match args.title.as_deref().map(str::trim) {
                Some("") => return Err("title is required".to_string()),
                title => title.map(str::to_string),
            };
            let patch = TodoPatch {
                title,
                description: args
                    .description
                    .map(|description| description.trim().to_string()),
                category_id: args.category,
                due_date: if args.clear_due {
                    Some(None)
                } else {
                    args.due.map(Some)
                },
                ..TodoPatch::default()
            };
            report_found(ctx.todos().update_todo(&args.id, &patch), "todo", &args.id)?;
        }
        TodoCommand::Toggle { id } => {
            report_found(ctx.todos().toggle_todo(&id), "todo", &id)?;
            if let Some(todo) = ctx.todos().get_todo_by_id(&id) {
                print_todo(&todo);
            }
        }
        TodoCommand::Delete { id } => report_found(ctx.todos().delete_todo(&id), "todo", &id)?,
        TodoCommand::Stats => {
            let stats = ctx.todos().stats();
            println!(
                "total={} completed={} active={}",
                stats.total, stats.completed, stats.active
            );
        }
    }
    Ok(())
}

fn execute_category(ctx: &AppContext, command: CategoryCommand) -> Result<(), String> {
    require_unlocked(ctx)?;
    match command {
        CategoryCommand::List { search } => {
            let categories = match search {
                Some(term) => ctx.categories().search_categories(&term),
                None => ctx.categories().categories(),
            };
            for category in categories {
                print_category(ctx, &category);
            }
        }
        CategoryCommand::Add { name } => {
            if name.trim().is_empty() {
                return Err("name is required".to_string());
            }
            let category = ctx.categories().add_category(name.trim());
            print_category(ctx, &category);
        }
        CategoryCommand::Rename { id, name } => {
            report_found(ctx.categories().update_category(&id, name.trim()), "category", &id)?
        }
        CategoryCommand::Delete { id } => {
            let count = ctx.categories().get_category_count(&id);
            report_found(ctx.categories().delete_category(&id), "category", &id)?;
            println!("deleted category {id} and {count} task(s)");
        }
    }
    Ok(())
}

fn execute_profile(ctx: &AppContext, command: ProfileCommand) -> Result<(), String> {
    require_unlocked(ctx)?;
    match command {
        ProfileCommand::Show => {}
        ProfileCommand::Set {
            name,
            avatar,
            about,
            tag,
            tag_color,
        } => {
            let tag_color = tag_color
                .map(|raw| {
                    TagColor::parse(&raw).ok_or_else(|| format!("unknown tag color `{raw}`"))
                })
                .transpose()?;
            ctx.profile().update_profile(&ProfilePatch {
                name,
                avatar,
                about,
                tag,
                tag_color,
            });
        }
        ProfileCommand::Reset => ctx.profile().reset_profile(),
    }

    let profile = ctx.profile().profile();
    let stats = ctx.todos().stats();
    println!("name={}", profile.name);
    println!("tag={} ({})", profile.tag, profile.tag_color.as_str());
    println!("about={}", profile.about);
    println!("avatar={}", profile.avatar);
    println!("tasks={} completed={}", stats.total, stats.completed);
    Ok(())
}

fn require_unlocked(ctx: &AppContext) -> Result<(), String> {
    if ctx.auth().is_authenticated() {
        Ok(())
    } else {
        Err("locked; run `taskdeck login <pin>` first".to_string())
    }
}

fn report_found(found: bool, kind: &str, id: &str) -> Result<(), String> {
    if found {
        Ok(())
    } else {
        Err(format!("{kind} `{id}` not found"))
    }
}

fn parse_repeat(raw: &[String]) -> Result<RepeatConfig, String> {
    let days = raw
        .iter()
        .map(|day| Weekday::parse(day).ok_or_else(|| format!("unknown weekday `{day}`")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RepeatConfig::on_days(days))
}

fn print_todo(todo: &Todo) {
    let mark = if todo.completed { "x" } else { " " };
    let due = todo
        .due_date
        .map(|due| format!(" due={due}"))
        .unwrap_or_default();
    let repeat = todo
        .repeat
        .as_ref()
        .filter(|repeat| repeat.enabled)
        .map(|repeat| {
            let days = repeat
                .days
                .iter()
                .map(|day| day.short_label())
                .collect::<Vec<_>>();
            format!(" repeat={}", days.join(","))
        })
        .unwrap_or_default();
    println!(
        "[{mark}] {} {} ({}){due}{repeat}",
        todo.id, todo.title, todo.category_id
    );
}

fn print_category(ctx: &AppContext, category: &Category) {
    println!(
        "{} {} {} tasks={}",
        category.id,
        category.name,
        category.color.as_str(),
        ctx.categories().get_category_count(&category.id)
    );
}

#[cfg(test)]
mod tests {
    use super::{
        execute, parse_repeat, Cli, Command, EditTodoArgs, ProfileCommand, ThemeMode, TodoCommand,
    };
    use clap::CommandFactory;
    use taskdeck_core::{AppContext, MemoryStateRepository, Weekday};

    fn locked_context() -> AppContext {
        AppContext::with_memory(MemoryStateRepository::new()).unwrap()
    }

    fn unlocked_context() -> AppContext {
        let ctx = locked_context();
        assert!(ctx.auth().validate_pin("1234"));
        ctx
    }

    fn edit_title(id: &str, title: &str) -> Command {
        Command::Todos(TodoCommand::Edit(EditTodoArgs {
            id: id.to_string(),
            title: Some(title.to_string()),
            description: None,
            category: None,
            due: None,
            clear_due: false,
        }))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_repeat_rejects_unknown_days() {
        let repeat = parse_repeat(&["mon".to_string(), "FRI".to_string()]).unwrap();
        assert!(repeat.repeats_on(Weekday::Fri));
        assert!(parse_repeat(&["funday".to_string()]).is_err());
    }

    #[test]
    fn locked_context_rejects_profile_and_theme_changes() {
        let ctx = locked_context();
        let before = ctx.profile().profile();

        let profile_err = execute(
            &ctx,
            Command::Profile(ProfileCommand::Set {
                name: Some("Mallory".to_string()),
                avatar: None,
                about: None,
                tag: None,
                tag_color: None,
            }),
        )
        .unwrap_err();
        assert!(profile_err.starts_with("locked"));
        assert_eq!(ctx.profile().profile(), before);

        let theme_err = execute(
            &ctx,
            Command::Theme {
                mode: Some(ThemeMode::Dark),
            },
        )
        .unwrap_err();
        assert!(theme_err.starts_with("locked"));
        assert!(!ctx.theme().is_dark_mode());

        assert!(execute(&ctx, Command::Profile(ProfileCommand::Show)).is_err());
        assert!(execute(&ctx, Command::Theme { mode: None }).is_err());
    }

    #[test]
    fn login_and_logout_stay_available_while_locked() {
        let ctx = locked_context();
        assert!(execute(&ctx, Command::Logout).is_ok());
        assert!(execute(&ctx, Command::Login { pin: "0000".to_string() }).is_err());
        assert!(execute(&ctx, Command::Login { pin: "1234".to_string() }).is_ok());
        assert!(execute(
            &ctx,
            Command::Theme {
                mode: Some(ThemeMode::Dark),
            }
        )
        .is_ok());
        assert!(ctx.theme().is_dark_mode());
    }

    #[test]
    fn edit_rejects_blank_title_and_trims_the_rest() {
        let ctx = unlocked_context();
        let before = ctx.todos().get_todo_by_id("1").unwrap();

        let err = execute(&ctx, edit_title("1", "   ")).unwrap_err();
        assert_eq!(err, "title is required");
        assert_eq!(ctx.todos().get_todo_by_id("1").unwrap(), before);

        execute(&ctx, edit_title("1", "  Buy oat milk  ")).unwrap();
        assert_eq!(ctx.todos().get_todo_by_id("1").unwrap().title, "Buy oat milk");
    }
}
