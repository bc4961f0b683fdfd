use std::sync::Arc;

use anyhow::{Context, Result, bail};
use attend_core::{
    CutoverHour, LoginError, LoginOutcome, LoginReport, LoginService, ProfileReport, UserProfile,
};
use chrono::Utc;
use serenity::all::{
    ButtonStyle, ChannelId, ComponentInteraction, CreateActionRow, CreateButton, CreateEmbed,
    CreateInteractionResponseFollowup, CreateMessage, EditInteractionResponse, GatewayIntents,
    Interaction, User,
};
use serenity::async_trait;
use serenity::builder::CreateEmbedFooter;
use serenity::client::Context as SerenityContext;
use serenity::prelude::*;
use tracing::{error, info, warn};

use crate::config::Config;

const LOGIN_BUTTON_ID: &str = "login";
const PROMPT_MESSAGE: &str = "ログインするには以下のボタンを押してください。";
const FAILURE_MESSAGE: &str = "ログインを完了できませんでした。時間をおいてもう一度お試しください。";
const PROFILE_COLOR: u32 = 0x3498db;

pub struct Handler {
    service: Arc<LoginService>,
    channel_id: ChannelId,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: SerenityContext, ready: serenity::model::gateway::Ready) {
        info!(user = %ready.user.name, "Bot connected");

        let button = CreateButton::new(LOGIN_BUTTON_ID)
            .label("LOGIN")
            .style(ButtonStyle::Primary);
        let message = CreateMessage::new()
            .content(PROMPT_MESSAGE)
            .components(vec![CreateActionRow::Buttons(vec![button])]);

        if let Err(e) = self.channel_id.send_message(&ctx.http, message).await {
            error!(error = %e, channel_id = self.channel_id.get(), "Failed to post login button");
        } else {
            info!(channel_id = self.channel_id.get(), "Login button posted");
        }
    }

    async fn interaction_create(&self, ctx: SerenityContext, interaction: Interaction) {
        if let Interaction::Component(component) = interaction
            && component.data.custom_id == LOGIN_BUTTON_ID
        {
            self.handle_login(&ctx, &component).await;
        }
    }
}

impl Handler {
    /// ログインボタンの押下を処理する。
    ///
    /// シートへのアクセスは Discord の応答期限 (3 秒) を超えうるため、
    /// 先に保留応答を返し、結果はその応答の編集として送る。
    async fn handle_login(&self, ctx: &SerenityContext, component: &ComponentInteraction) {
        let user = &component.user;
        if let Err(e) = component.defer_ephemeral(&ctx.http).await {
            error!(error = %e, user_id = user.id.get(), "Failed to acknowledge login button");
            return;
        }

        let display_name = user.tag();
        let result = self
            .service
            .on_login_request(&user.id.to_string(), &display_name, Utc::now())
            .await;

        match &result {
            Ok(report) => info!(
                user = %display_name,
                at = %report.decision.timestamp,
                outcome = ?report.outcome(),
                "Login button handled"
            ),
            Err(e) => error!(error = ?e, user_id = user.id.get(), "Login failed"),
        }

        let reply = LoginReply::from_result(&result);
        let response = EditInteractionResponse::new().content(reply.message);
        if let Err(e) = component.edit_response(&ctx.http, response).await {
            error!(error = %e, user_id = user.id.get(), "Failed to send login result");
            return;
        }

        let followup = match reply.followup {
            Some(ReplyFollowup::Profile(profile)) => {
                CreateInteractionResponseFollowup::new().embed(profile_embed(user, &profile))
            }
            Some(ReplyFollowup::MissingProfile(cutover)) => {
                CreateInteractionResponseFollowup::new().content(missing_profile_message(cutover))
            }
            None => return,
        };

        // ログイン自体は完了しているので、ここでの失敗は警告に留める
        if let Err(e) = component
            .create_followup(&ctx.http, followup.ephemeral(true))
            .await
        {
            warn!(error = %e, user_id = user.id.get(), "Failed to send profile");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplyFollowup {
    Profile(UserProfile),
    MissingProfile(CutoverHour),
}

/// ボタン押下への返信内容。
#[derive(Debug, Clone, PartialEq, Eq)]
struct LoginReply {
    message: &'static str,
    followup: Option<ReplyFollowup>,
}

impl LoginReply {
    /// ストアのエラーは詳細を伏せた定型文にする。
    fn from_result(result: &std::result::Result<LoginReport, LoginError>) -> Self {
        let Ok(report) = result else {
            return Self {
                message: FAILURE_MESSAGE,
                followup: None,
            };
        };

        let followup = match &report.profile {
            ProfileReport::Found(profile) => Some(ReplyFollowup::Profile(profile.clone())),
            ProfileReport::Missing { cutover } => Some(ReplyFollowup::MissingProfile(*cutover)),
            ProfileReport::Omitted => None,
        };

        Self {
            message: outcome_message(report.outcome()),
            followup,
        }
    }
}

fn outcome_message(outcome: LoginOutcome) -> &'static str {
    match outcome {
        LoginOutcome::Recorded => "ログインできました！",
        LoginOutcome::AlreadyLoggedIn => "本日はすでにログイン済みです。",
    }
}

fn missing_profile_message(cutover: CutoverHour) -> String {
    format!(
        "ユーザーIDが見つかりませんでした。明日の{}時以降にポイントの照会ができるようになります。",
        cutover
    )
}

/// Discord は空の field 値を受け付けないので代わりの文字を入れる。
fn field_value(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

fn profile_embed(user: &User, profile: &UserProfile) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("ユーザー情報")
        .description(format!("{} の情報", user.tag()))
        .color(PROFILE_COLOR)
        .thumbnail(user.face());

    for (name, value) in profile.fields() {
        embed = embed.field(name, field_value(value), false);
    }

    embed.footer(CreateEmbedFooter::new(format!(
        "ユーザーID: {}",
        profile.user_id
    )))
}

pub async fn run(config: &Config, service: Arc<LoginService>) -> Result<()> {
    if config.discord.channel_id == 0 {
        bail!("discord.channel_id is not set");
    }

    let intents = GatewayIntents::GUILDS;
    let handler = Handler {
        service,
        channel_id: ChannelId::new(config.discord.channel_id),
    };

    let mut client = Client::builder(&config.discord.token, intents)
        .event_handler(handler)
        .await
        .context("Failed to create client")?;

    info!("Starting bot");
    client.start().await.context("Client error")?;

    Ok(())
}
