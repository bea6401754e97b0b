//! Subcommand handlers. Each one drives a core view: it executes the
//! requests the view hands out and feeds the outcomes back until the view
//! settles, then prints the result.

use anyhow::{anyhow, bail, Context, Result};
use student_core::view::{
    DetailState, DetailView, FormView, ListRequest, ListView, Navigation, Pending,
};
use student_core::{Field, StudentQuery};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::{debug, info};

use crate::api::StudentApi;
use crate::cli::{flag_name, Commands, CreateArgs, Order, SearchBy, StudentFields};
use crate::config::Config;
use crate::render;

const BROWSE_HELP: &str = "\
commands:
  n          next page
  p          previous page
  g N        go to page N
  s KEYWORD  search (s alone clears the search)
  d ID       delete a student
  r          reload
  h          this help
  q          quit";

pub async fn run(command: Commands, config: &Config) -> Result<()> {
    if let Commands::Config = command {
        show_config(config);
        return Ok(());
    }

    let api = StudentApi::from_config(config).context("cannot set up HTTP client")?;
    match command {
        Commands::List { page, sort, order } => list(&api, config, page, sort, order).await,
        Commands::Search { keyword, by, page } => search(&api, config, keyword, by, page).await,
        Commands::Show { id } => show(&api, id).await,
        Commands::Create(args) => create(&api, &args).await,
        Commands::Edit { id, fields } => edit(&api, id, &fields).await,
        Commands::Delete { id, yes } => delete(&api, id, yes).await,
        Commands::Browse => browse(&api, config).await,
        Commands::Config => Ok(()),
    }
}

fn show_config(config: &Config) {
    match Config::config_path() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no home directory, config file disabled"),
    }
    print!("{}", config.to_toml());
}

/// Execute `pending` and every follow-up the list view asks for.
pub async fn drive_list(api: &StudentApi, view: &mut ListView, pending: Pending<ListRequest>) {
    let mut next = Some(pending);
    while let Some(p) = next {
        debug!(seq = p.ticket.seq(), kind = ?p.ticket.kind, "list request");
        let outcome = api.execute(p.request).await;
        next = view.complete(p.ticket, outcome);
    }
}

fn list_result(view: &ListView) -> Result<()> {
    if let Some(err) = view.error() {
        return Err(err.clone().into());
    }
    println!("{}", render::list_view(view));
    Ok(())
}

async fn list(api: &StudentApi, config: &Config, page: u32, sort: String, order: Order) -> Result<()> {
    let mut view = ListView::new(api.client().clone(), config.page_size).with_order(sort, order.into());
    let pending = view.go_to_page(page);
    drive_list(api, &mut view, pending).await;
    list_result(&view)
}

async fn search(
    api: &StudentApi,
    config: &Config,
    keyword: String,
    by: SearchBy,
    page: u32,
) -> Result<()> {
    let query = match by {
        SearchBy::Any => StudentQuery::Keyword(keyword),
        SearchBy::Name => StudentQuery::Name(keyword),
        SearchBy::Phone => StudentQuery::Phone(keyword),
    };
    let mut view = ListView::new(api.client().clone(), config.page_size);
    let mut pending = view.search_by(query);
    if page > 0 {
        // the first-page request is superseded and never sent
        pending = view.go_to_page(page);
    }
    drive_list(api, &mut view, pending).await;
    list_result(&view)
}

async fn show(api: &StudentApi, id: i64) -> Result<()> {
    let mut view = DetailView::new(api.client().clone(), id);
    let p = view.mount();
    let outcome = api.execute(p.request).await;
    view.complete(p.ticket, outcome);
    match view.state() {
        DetailState::Loaded(student) => {
            println!("{}", render::detail(student));
            Ok(())
        }
        DetailState::NotFound => bail!("Student {id} not found"),
        DetailState::Failed(err) => Err(err.clone().into()),
        DetailState::Loading => bail!("no response for student {id}"),
    }
}

fn apply(form: &mut FormView, assignments: Vec<(Field, String)>) -> Result<()> {
    for (field, value) in assignments {
        form.set_field(field, &value)
            .with_context(|| format!("invalid --{}", flag_name(field)))?;
    }
    Ok(())
}

/// Validate, send, and wait for the save to land.
async fn save(api: &StudentApi, form: &mut FormView) -> Result<()> {
    let Some(p) = form.submit() else {
        return Err(form
            .error()
            .cloned()
            .map(anyhow::Error::from)
            .unwrap_or_else(|| anyhow!("nothing to save")));
    };
    let outcome = api.execute(p.request).await;
    match form.complete(p.ticket, outcome) {
        Some(Navigation::ToList) => Ok(()),
        None => Err(form
            .error()
            .cloned()
            .map(anyhow::Error::from)
            .unwrap_or_else(|| anyhow!("save did not complete"))),
    }
}

async fn create(api: &StudentApi, args: &CreateArgs) -> Result<()> {
    let mut form = FormView::create(api.client().clone());
    apply(&mut form, args.assignments())?;
    save(api, &mut form).await?;
    info!(name = %form.draft().name, "created student");
    println!("Student created.");
    Ok(())
}

async fn edit(api: &StudentApi, id: i64, fields: &StudentFields) -> Result<()> {
    let assignments = fields.assignments();
    if assignments.is_empty() {
        bail!("nothing to change; pass at least one field flag");
    }

    let mut form = FormView::edit(api.client().clone(), id);
    if let Some(p) = form.mount() {
        let outcome = api.execute(p.request).await;
        form.complete(p.ticket, outcome);
    }
    if let Some(err) = form.error() {
        if err.source.is_not_found() {
            bail!("Student {id} not found");
        }
        return Err(err.clone().into());
    }

    apply(&mut form, assignments)?;
    save(api, &mut form).await?;
    println!("Student {id} updated.");
    Ok(())
}

async fn delete(api: &StudentApi, id: i64, yes: bool) -> Result<()> {
    let mut view = DetailView::new(api.client().clone(), id);
    view.request_delete();
    if !yes {
        let mut prompt = Prompt::stdin();
        if !prompt.confirm(&format!("Delete student {id}?")).await? {
            view.cancel_delete();
            println!("Cancelled.");
            return Ok(());
        }
    }
    let Some(p) = view.confirm_delete() else {
        return Ok(());
    };
    let outcome = api.execute(p.request).await;
    match view.complete(p.ticket, outcome) {
        Some(Navigation::ToList) => {
            println!("Student {id} deleted.");
            Ok(())
        }
        None => match view.delete_error() {
            Some(err) if err.source.is_not_found() => bail!("Student {id} not found"),
            Some(err) => Err(err.clone().into()),
            None => bail!("delete of student {id} did not complete"),
        },
    }
}

/// Line-oriented stdin reader shared by prompts and the browser.
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `label` and read one line. `None` on end of input.
    pub async fn read(&mut self, label: &str) -> Result<Option<String>> {
        let mut out = tokio::io::stdout();
        out.write_all(label.as_bytes()).await?;
        out.flush().await?;
        Ok(self.lines.next_line().await?)
    }

    pub async fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.read(&format!("{question} [y/N] ")).await?;
        Ok(matches!(
            answer.as_deref().map(str::trim),
            Some("y" | "Y" | "yes")
        ))
    }
}

/// One parsed line of the interactive browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Previous,
    Goto(u32),
    Search(String),
    Delete(i64),
    Reload,
    Help,
    Quit,
}

impl BrowseCommand {
    /// Pages are entered one-based, as the footer shows them.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match head {
            "n" => Ok(Self::Next),
            "p" => Ok(Self::Previous),
            "g" => match rest.parse::<u32>() {
                Ok(n) if n >= 1 => Ok(Self::Goto(n - 1)),
                _ => Err(format!("not a page number: {rest:?}")),
            },
            "s" => Ok(Self::Search(rest.to_string())),
            "d" => rest
                .parse()
                .map(Self::Delete)
                .map_err(|_| format!("not a student id: {rest:?}")),
            "r" => Ok(Self::Reload),
            "h" | "?" | "" => Ok(Self::Help),
            "q" => Ok(Self::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

async fn browse(api: &StudentApi, config: &Config) -> Result<()> {
    let mut view = ListView::new(api.client().clone(), config.page_size);
    let mut prompt = Prompt::stdin();

    let pending = view.mount();
    drive_list(api, &mut view, pending).await;
    print_view(&view);
    println!("{BROWSE_HELP}");

    while let Some(line) = prompt.read("> ").await? {
        let command = match BrowseCommand::parse(&line) {
            Ok(command) => command,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };
        let pending = match command {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => {
                println!("{BROWSE_HELP}");
                continue;
            }
            BrowseCommand::Next => view.next_page(),
            BrowseCommand::Previous => view.previous_page(),
            BrowseCommand::Goto(page) => Some(view.go_to_page(page)),
            BrowseCommand::Search(keyword) => Some(view.submit_search(&keyword)),
            BrowseCommand::Reload => Some(view.reload()),
            BrowseCommand::Delete(id) => {
                view.request_delete(id);
                if prompt.confirm(&format!("Delete student {id}?")).await? {
                    view.confirm_delete()
                } else {
                    view.cancel_delete();
                    println!("Cancelled.");
                    continue;
                }
            }
        };
        match pending {
            Some(p) => {
                drive_list(api, &mut view, p).await;
                print_view(&view);
            }
            None => println!("No such page."),
        }
    }
    Ok(())
}

fn print_view(view: &ListView) {
    if let Some(err) = view.error() {
        println!("{err}");
    }
    println!("{}", render::list_view(view));
}
