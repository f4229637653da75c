use cipherpad::{
    app,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    device::EmulatedDevice,
    driver,
    hooks::HookRegistry,
    logging,
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    settings::{InitMethod, InitSettings, WordCount},
    App,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io::{self, stdin, BufRead, Write},
    sync::Arc,
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// terminal front-end for hardware wallet seed recovery
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Recover a hardware wallet seed through the device's recovery cipher. Every keystroke is checked against the firmware's input rules before it is sent."
)]
pub struct Cli {
    /// how to initialise the device
    #[clap(short = 'm', long, value_enum, default_value_t = InitMethod::Recover)]
    method: InitMethod,

    /// seed length (defaults to the configured value)
    #[clap(short = 'w', long, value_enum)]
    words: Option<WordCount>,

    /// label to name the device
    #[clap(short = 'l', long)]
    label: Option<String>,

    /// disable PIN protection
    #[clap(long)]
    no_pin: bool,

    /// enable passphrase protection
    #[clap(long)]
    passphrase: bool,

    /// PIN (digits 1-9) when loading a mnemonic or private key
    #[clap(long)]
    load_pin: Option<String>,

    /// store these settings as the new defaults
    #[clap(long)]
    save_config: bool,

    /// log level, RUST_LOG overrides it
    #[clap(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Merges flags over the stored configuration
    fn to_settings(&self, config: &Config) -> InitSettings {
        InitSettings {
            method: self.method,
            label: self.label.clone().unwrap_or_else(|| config.label.clone()),
            word_count: self.words.unwrap_or_else(|| config.word_count()),
            pin_protection: !self.no_pin && config.pin_protection,
            passphrase_protection: self.passphrase || config.passphrase_protection,
            secret: String::new(),
            pin: self.load_pin.clone().unwrap_or_default(),
        }
    }
}

fn read_secret(method: InitMethod) -> io::Result<String> {
    let prompt = match method {
        InitMethod::Mnemonic => "Enter your BIP39 mnemonic: ",
        _ => "Enter the master private key beginning with xprv: ",
    };
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let config = store.load();

    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    if let Some(path) = AppDirs::log_path() {
        if let Err(err) = logging::init(&level, &path) {
            eprintln!("logging disabled: {}", err);
        }
    }

    let mut settings = cli.to_settings(&config);
    if matches!(settings.method, InitMethod::Mnemonic | InitMethod::PrivateKey) {
        settings.secret = read_secret(settings.method)?;
    }
    let settings = match settings.validated() {
        Ok(settings) => settings,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, err.to_string()).exit();
        }
    };

    if cli.save_config {
        store.save(&config.with_settings(&settings))?;
        log::info!("saved defaults to {}", store.path().display());
    }

    let hooks = Arc::new(HookRegistry::with_logging());
    let (worker, port) = driver::spawn(EmulatedDevice::new(), settings.clone(), hooks);
    let (prompts, replies) = port.into_parts();

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(prompts),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut app = App::new(settings, replies).with_session_timeout(config.session_timeout());
    let result = app::run(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;
    result?;

    if app.session_timeout != config.session_timeout() {
        let updated = Config {
            session_timeout_minutes: app.session_timeout,
            ..config
        };
        if let Err(err) = store.save(&updated) {
            log::warn!("could not store the session timeout: {}", err);
        }
    }

    // dropping the app closes the reply channel, which releases a blocked worker
    drop(app);
    match worker.join() {
        Ok(Ok(outcome)) => println!("{}", outcome.message),
        Ok(Err(err)) => println!("{}", err),
        Err(_) => log::error!("recovery worker panicked"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["cipherpad"]);

        assert_eq!(cli.method, InitMethod::Recover);
        assert_eq!(cli.words, None);
        assert_eq!(cli.label, None);
        assert!(!cli.no_pin);
        assert!(!cli.passphrase);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_word_count_values() {
        let cli = Cli::parse_from(["cipherpad", "-w", "18"]);
        assert_eq!(cli.words, Some(WordCount::Eighteen));
        assert!(Cli::try_parse_from(["cipherpad", "-w", "15"]).is_err());
    }

    #[test]
    fn test_cli_method_values() {
        let cli = Cli::parse_from(["cipherpad", "--method", "private-key"]);
        assert_eq!(cli.method, InitMethod::PrivateKey);
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            word_count: 12,
            label: "stored".into(),
            ..Config::default()
        };
        let cli = Cli::parse_from([
            "cipherpad",
            "--label",
            "flag",
            "--no-pin",
            "--passphrase",
        ]);
        let settings = cli.to_settings(&config);
        assert_eq!(settings.label, "flag");
        assert_eq!(settings.word_count, WordCount::Twelve);
        assert!(!settings.pin_protection);
        assert!(settings.passphrase_protection);
    }

    #[test]
    fn test_config_used_without_flags() {
        let config = Config {
            label: "stored".into(),
            pin_protection: false,
            ..Config::default()
        };
        let settings = Cli::parse_from(["cipherpad"]).to_settings(&config);
        assert_eq!(settings.label, "stored");
        assert_eq!(settings.word_count, WordCount::TwentyFour);
        assert!(!settings.pin_protection);
    }
}
