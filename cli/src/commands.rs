//! Command-line surface and dispatch.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every subcommand maps onto one session or resource call. Results are
//! returned as JSON values; `main` decides how to print them.

use std::rc::Rc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use client::config::{API_BASE_URL_ENV, ClientConfig, DEFAULT_API_BASE_URL};
use client::net::api;
use client::net::gateway::Gateway;
use client::net::types::{
    CollaboratorRole, ListParams, PromptCreate, PromptImplementationCreate, PromptShare, PromptTagCreate,
    PromptTagUpdate, PromptUpdate, UserAdminUpdate,
};
use client::state::auth::Session;
use client::state::token_store::TokenStore;
use serde_json::Value;

use crate::error::CliError;
use crate::token_file::{FileTokenBackend, default_token_path};
use crate::transport::ReqwestTransport;

#[derive(Parser, Debug)]
#[command(name = "promptworks", about = "PromptWorks API client")]
pub struct Cli {
    #[arg(long, env = API_BASE_URL_ENV, default_value = DEFAULT_API_BASE_URL)]
    pub base_url: String,

    /// Where the access token is persisted between runs.
    #[arg(long, env = "PROMPTWORKS_TOKEN_FILE")]
    pub token_file: Option<std::path::PathBuf>,

    #[arg(long, default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and remember the issued token.
    Login {
        username: String,
        #[arg(long, env = "PROMPTWORKS_PASSWORD")]
        password: String,
    },
    /// Register an account. Does not log in.
    Signup {
        username: String,
        #[arg(long, env = "PROMPTWORKS_PASSWORD")]
        password: String,
    },
    /// Forget the stored token.
    Logout,
    /// Show the user the stored token belongs to.
    Whoami,
    Prompts(PromptsCommand),
    Tags(TagsCommand),
    Users(UsersCommand),
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[arg(long)]
    pub q: Option<String>,
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub offset: Option<u32>,
}

impl From<ListArgs> for ListParams {
    fn from(args: ListArgs) -> Self {
        Self { q: args.q, limit: args.limit, offset: args.offset }
    }
}

#[derive(Args, Debug)]
pub struct PromptsCommand {
    #[command(subcommand)]
    pub command: PromptsSubcommand,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Viewer,
    Editor,
}

impl From<RoleArg> for CollaboratorRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Viewer => CollaboratorRole::Viewer,
            RoleArg::Editor => CollaboratorRole::Editor,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum PromptsSubcommand {
    List(ListArgs),
    Get {
        prompt_id: i64,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        version: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        class_id: Option<i64>,
        #[arg(long)]
        class_name: Option<String>,
        #[arg(long = "tag-id")]
        tag_ids: Vec<i64>,
    },
    Update {
        prompt_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        class_id: Option<i64>,
        #[arg(long = "tag-id")]
        tag_ids: Option<Vec<i64>>,
    },
    Delete {
        prompt_id: i64,
    },
    AddVersion {
        prompt_id: i64,
        #[arg(long)]
        version: String,
        #[arg(long)]
        content: String,
    },
    SwitchVersion {
        prompt_id: i64,
        version_id: i64,
    },
    Collaborators {
        prompt_id: i64,
    },
    Share {
        prompt_id: i64,
        username: String,
        #[arg(long, value_enum, default_value_t = RoleArg::Viewer)]
        role: RoleArg,
    },
    Revoke {
        prompt_id: i64,
        user_id: i64,
    },
    Implementations {
        prompt_id: i64,
    },
    AddImplementation {
        prompt_id: i64,
        #[arg(long)]
        content: String,
    },
}

#[derive(Args, Debug)]
pub struct TagsCommand {
    #[command(subcommand)]
    pub command: TagsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TagsSubcommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        color: String,
    },
    Update {
        tag_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    Delete {
        tag_id: i64,
    },
}

#[derive(Args, Debug)]
pub struct UsersCommand {
    #[command(subcommand)]
    pub command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum UsersSubcommand {
    List(ListArgs),
    Get {
        user_id: i64,
    },
    Update {
        user_id: i64,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        superuser: Option<bool>,
    },
}

/// Session over a file-backed store and the native transport.
///
/// # Errors
///
/// Returns [`CliError::NoTokenPath`] when no token file was given and the
/// platform has no local data directory.
pub fn build_session(base_url: &str, token_file: Option<std::path::PathBuf>) -> Result<Session, CliError> {
    let path = token_file.or_else(default_token_path).ok_or(CliError::NoTokenPath)?;
    tracing::debug!(path = %path.display(), "using token file");
    let store = TokenStore::new(Rc::new(FileTokenBackend::new(path)));
    let gateway = Gateway::new(ClientConfig::new(Some(base_url)), store, Rc::new(ReqwestTransport::default()));
    Ok(Session::new(gateway))
}

/// Run `command` against `session`.
///
/// # Errors
///
/// Returns the first login, API or serialization failure.
pub async fn run(session: &Session, command: Command) -> Result<Value, CliError> {
    match command {
        Command::Login { username, password } => {
            session.login(&username, &password).await?;
            let user = session.current_user().ok_or(CliError::LoginIncomplete)?;
            Ok(serde_json::to_value(user)?)
        }
        Command::Signup { username, password } => {
            let user = session.signup(&username, &password).await?;
            Ok(serde_json::to_value(user)?)
        }
        Command::Logout => {
            session.logout();
            Ok(Value::Null)
        }
        Command::Whoami => {
            session.load_user().await;
            let user = session.current_user().ok_or(CliError::NotLoggedIn)?;
            Ok(serde_json::to_value(user)?)
        }
        Command::Prompts(prompts) => run_prompts(session.gateway(), prompts.command).await,
        Command::Tags(tags) => run_tags(session.gateway(), tags.command).await,
        Command::Users(users) => run_users(session.gateway(), users.command).await,
    }
}

async fn run_prompts(gateway: &Gateway, command: PromptsSubcommand) -> Result<Value, CliError> {
    let value = match command {
        PromptsSubcommand::List(args) => serde_json::to_value(api::list_prompts(gateway, &args.into()).await?)?,
        PromptsSubcommand::Get { prompt_id } => serde_json::to_value(api::get_prompt(gateway, prompt_id).await?)?,
        PromptsSubcommand::Create { name, version, content, description, author, class_id, class_name, tag_ids } => {
            let payload = PromptCreate {
                name,
                description,
                author,
                class_id,
                class_name,
                class_description: None,
                version,
                content,
                tag_ids: (!tag_ids.is_empty()).then_some(tag_ids),
            };
            serde_json::to_value(api::create_prompt(gateway, &payload).await?)?
        }
        PromptsSubcommand::Update { prompt_id, name, description, author, class_id, tag_ids } => {
            let payload = PromptUpdate { name, description, author, class_id, tag_ids, ..PromptUpdate::default() };
            serde_json::to_value(api::update_prompt(gateway, prompt_id, &payload).await?)?
        }
        PromptsSubcommand::Delete { prompt_id } => {
            api::delete_prompt(gateway, prompt_id).await?;
            Value::Null
        }
        PromptsSubcommand::AddVersion { prompt_id, version, content } => {
            serde_json::to_value(api::create_prompt_version(gateway, prompt_id, &version, &content).await?)?
        }
        PromptsSubcommand::SwitchVersion { prompt_id, version_id } => {
            let prompt = api::get_prompt(gateway, prompt_id).await?;
            let version = prompt
                .versions
                .iter()
                .find(|version| version.id == version_id)
                .ok_or(CliError::UnknownVersion { prompt_id, version_id })?;
            serde_json::to_value(api::switch_prompt_version(gateway, prompt_id, version).await?)?
        }
        PromptsSubcommand::Collaborators { prompt_id } => {
            serde_json::to_value(api::list_prompt_collaborators(gateway, prompt_id).await?)?
        }
        PromptsSubcommand::Share { prompt_id, username, role } => {
            let payload = PromptShare { username, role: role.into() };
            serde_json::to_value(api::share_prompt(gateway, prompt_id, &payload).await?)?
        }
        PromptsSubcommand::Revoke { prompt_id, user_id } => {
            api::revoke_prompt_share(gateway, prompt_id, user_id).await?;
            Value::Null
        }
        PromptsSubcommand::Implementations { prompt_id } => {
            serde_json::to_value(api::list_prompt_implementations(gateway, prompt_id).await?)?
        }
        PromptsSubcommand::AddImplementation { prompt_id, content } => {
            let payload = PromptImplementationCreate { content };
            serde_json::to_value(api::create_prompt_implementation(gateway, prompt_id, &payload).await?)?
        }
    };
    Ok(value)
}

async fn run_tags(gateway: &Gateway, command: TagsSubcommand) -> Result<Value, CliError> {
    let value = match command {
        TagsSubcommand::List => serde_json::to_value(api::list_prompt_tags(gateway).await?)?,
        TagsSubcommand::Create { name, color } => {
            serde_json::to_value(api::create_prompt_tag(gateway, &PromptTagCreate { name, color }).await?)?
        }
        TagsSubcommand::Update { tag_id, name, color } => {
            serde_json::to_value(api::update_prompt_tag(gateway, tag_id, &PromptTagUpdate { name, color }).await?)?
        }
        TagsSubcommand::Delete { tag_id } => {
            api::delete_prompt_tag(gateway, tag_id).await?;
            Value::Null
        }
    };
    Ok(value)
}

async fn run_users(gateway: &Gateway, command: UsersSubcommand) -> Result<Value, CliError> {
    let value = match command {
        UsersSubcommand::List(args) => serde_json::to_value(api::list_users(gateway, &args.into()).await?)?,
        UsersSubcommand::Get { user_id } => serde_json::to_value(api::get_user(gateway, user_id).await?)?,
        UsersSubcommand::Update { user_id, password, active, superuser } => {
            let payload = UserAdminUpdate { password, is_active: active, is_superuser: superuser };
            serde_json::to_value(api::update_user(gateway, user_id, &payload).await?)?
        }
    };
    Ok(value)
}
