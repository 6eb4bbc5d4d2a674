//! Implements InputPort. Inquire-based interactive menu over an `AnalysisSession`.

use crate::adapters::devices::{load_clip, load_photo};
use crate::adapters::ui::render;
use crate::domain::DomainError;
use crate::ports::InputPort;
use crate::usecases::{AnalysisSession, AudioState, VideoState};
use async_trait::async_trait;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{InquireError, Select, Text};
use std::fmt;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

/// Apply the prompt theme for all subsequent inquire prompts.
pub fn apply_theme() {
    let violet = Color::Rgb {
        r: 0x66,
        g: 0x7e,
        b: 0xea,
    };
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("?").with_fg(violet))
        .with_highlighted_option_prefix(Styled::new(">").with_fg(violet));
    inquire::set_global_render_config(config);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    WriteText,
    OpenCamera,
    UploadPhoto,
    CapturePhoto,
    CancelCamera,
    StartRecording { rerecord: bool },
    StopRecording { secs: u64 },
    UploadClip,
    Analyze,
    Reset,
    Quit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuAction::WriteText => write!(f, "How are you feeling? (text)"),
            MenuAction::OpenCamera => write!(f, "Open camera"),
            MenuAction::UploadPhoto => write!(f, "Upload photo"),
            MenuAction::CapturePhoto => write!(f, "Capture"),
            MenuAction::CancelCamera => write!(f, "Cancel camera"),
            MenuAction::StartRecording { rerecord: false } => write!(f, "Start recording"),
            MenuAction::StartRecording { rerecord: true } => write!(f, "Re-record"),
            MenuAction::StopRecording { secs } => write!(f, "Stop recording ({}s)", secs),
            MenuAction::UploadClip => write!(f, "Upload voice clip"),
            MenuAction::Analyze => write!(f, "Analyze emotions"),
            MenuAction::Reset => write!(f, "Reset inputs"),
            MenuAction::Quit => write!(f, "Quit"),
        }
    }
}

/// Options for the current session state. Analyze only appears once inputs are ready.
fn menu_for(session: &AnalysisSession) -> Vec<MenuAction> {
    let mut options = vec![MenuAction::WriteText];
    if session.video_state() == VideoState::Live {
        options.push(MenuAction::CapturePhoto);
        options.push(MenuAction::CancelCamera);
    } else {
        options.push(MenuAction::OpenCamera);
        options.push(MenuAction::UploadPhoto);
    }
    if session.audio_state() == AudioState::Recording {
        options.push(MenuAction::StopRecording {
            secs: session.recording_secs(),
        });
    } else {
        options.push(MenuAction::StartRecording {
            rerecord: session.inputs().audio().is_some(),
        });
        options.push(MenuAction::UploadClip);
    }
    if session.inputs().is_ready() && !session.presentation().loading {
        options.push(MenuAction::Analyze);
    }
    options.push(MenuAction::Reset);
    options.push(MenuAction::Quit);
    options
}

fn status_line(session: &AnalysisSession) -> String {
    let inputs = session.inputs();
    let tick = |ok: bool| if ok { "[x]" } else { "[ ]" };
    format!(
        "{} text  {} photo  {} audio",
        tick(!inputs.text().trim().is_empty()),
        tick(inputs.image().is_some()),
        tick(inputs.audio().is_some()),
    )
}

/// Sub-prompt answer. `None` when the user backs out with Esc.
fn answer<T>(result: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

/// Main menu selection. Esc redraws the menu, Ctrl-C quits.
fn menu_choice(
    result: Result<MenuAction, InquireError>,
) -> Result<Option<MenuAction>, DomainError> {
    match result {
        Ok(action) => Ok(Some(action)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(InquireError::OperationInterrupted) => Ok(Some(MenuAction::Quit)),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

/// The prompts the menu loop issues.
trait Prompter: Send + Sync {
    fn select(&self, message: &str, options: Vec<MenuAction>) -> Result<MenuAction, InquireError>;

    fn text(&self, message: &str, initial: &str, placeholder: &str)
    -> Result<String, InquireError>;
}

struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn select(&self, message: &str, options: Vec<MenuAction>) -> Result<MenuAction, InquireError> {
        Select::new(message, options).prompt()
    }

    fn text(
        &self,
        message: &str,
        initial: &str,
        placeholder: &str,
    ) -> Result<String, InquireError> {
        let mut prompt = Text::new(message).with_initial_value(initial);
        if !placeholder.is_empty() {
            prompt = prompt.with_placeholder(placeholder);
        }
        prompt.prompt()
    }
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    session: Mutex<AnalysisSession>,
    chart_dir: PathBuf,
    prompter: Box<dyn Prompter>,
}

impl TuiInputPort {
    /// `chart_dir` receives `chart.png` whenever a result carries a chart.
    pub fn new(session: AnalysisSession, chart_dir: impl Into<PathBuf>) -> Self {
        Self {
            session: Mutex::new(session),
            chart_dir: chart_dir.into(),
            prompter: Box::new(InquirePrompter),
        }
    }

    fn ask_path(&self, message: &str) -> Result<Option<PathBuf>, DomainError> {
        let path = answer(self.prompter.text(message, "", ""))?;
        Ok(path
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from))
    }

    /// Run one menu action. Returns false when the user quits.
    async fn handle(&self, session: &mut AnalysisSession, action: MenuAction) -> bool {
        let outcome = match action {
            MenuAction::WriteText => answer(self.prompter.text(
                "How are you feeling?",
                session.inputs().text(),
                "Express your emotions in words...",
            ))
            .map(|text| {
                if let Some(text) = text {
                    session.set_text(text);
                }
            }),
            MenuAction::OpenCamera => session.open_camera().await,
            MenuAction::CapturePhoto => session.capture_photo().await,
            MenuAction::CancelCamera => {
                session.cancel_camera();
                Ok(())
            }
            MenuAction::UploadPhoto => match self.ask_path("Path to photo:") {
                Ok(Some(path)) => load_photo(&path)
                    .await
                    .map(|photo| session.use_photo(photo)),
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            },
            MenuAction::StartRecording { .. } => session.start_recording().await,
            MenuAction::StopRecording { .. } => session.stop_recording().await,
            MenuAction::UploadClip => match self.ask_path("Path to voice clip:") {
                Ok(Some(path)) => load_clip(&path).await.map(|clip| session.use_clip(clip)),
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            },
            MenuAction::Analyze => {
                let spinner = render::analyzing_spinner();
                let result = session.analyze().await.map(|_| ());
                spinner.finish_and_clear();
                render::print_state(&session.presentation(), &self.chart_dir);
                // Failures are already shown as part of the presentation state.
                match result {
                    Err(e) if e.is_silent() => Err(e),
                    _ => Ok(()),
                }
            }
            MenuAction::Reset => {
                session.reset();
                Ok(())
            }
            MenuAction::Quit => return false,
        };

        match outcome {
            Ok(()) => {}
            Err(e) if e.is_silent() => debug!(error = %e, "ignored"),
            Err(e) => println!("  ! {}", e),
        }
        true
    }

    async fn drive(&self, session: &mut AnalysisSession) -> Result<(), DomainError> {
        loop {
            let prompt = status_line(session);
            let choice = self.prompter.select(&prompt, menu_for(session));
            let Some(action) = menu_choice(choice)? else {
                continue;
            };
            if !self.handle(session, action).await {
                return Ok(());
            }
        }
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let mut session = self.session.lock().await;
        render::print_state(&session.presentation(), &self.chart_dir);
        let outcome = self.drive(&mut session).await;
        session.release_devices().await;
        outcome
    }
}
