//! Shell programs
//!
//! The whole command set. None of these do anything real; they print,
//! prompt, and sleep through the [`Context`], and every `?` on those calls
//! is where Ctrl+C ends them.

use super::registry::{Command, CommandRegistry, HelpEntry};
use super::Context;
use crate::editor::{IoResult, ReadOptions};
use futures::FutureExt;
use futures::future::LocalBoxFuture;

type Program = LocalBoxFuture<'static, IoResult<()>>;

const GREEN: &str = "\x1b[92m";
const RESET: &str = "\x1b[0m";

/// Register every program
pub fn register(reg: &mut CommandRegistry) {
    reg.register("clear", Command::new(clear).with_help("Clears the terminal screen."));
    reg.register(
        "echo",
        Command::new(echo).with_help(
            "Usage: echo [...arguments]\r\nEchoes the provided arguments back to the terminal.",
        ),
    );
    reg.register("emacs", Command::new(emacs).hidden());
    reg.register("exit", Command::new(exit).with_help("Exits the shell."));
    reg.register("hello", Command::new(hello));
    reg.register(
        "help",
        Command::new(help).with_help(
            "Usage: 'help' or 'help [command]'\r\nDisplays a list of available commands or detailed information about a specific command.",
        ),
    );
    reg.register("neofetch", Command::new(neofetch));
    reg.register("no", Command::new(no));
    reg.register("nvim", Command::new(nvim).hidden());
    reg.register(
        "sudo",
        Command::new(sudo).with_help(
            "Usage: sudo [command] [...arguments]\r\nExecute a command with superuser privileges.\r\nYou will be prompted for a password.",
        ),
    );
    reg.register("vi", Command::new(vi).hidden());
    reg.register("vim", Command::new(vim).hidden());
    reg.register("yes", Command::new(yes));
}

fn clear(ctx: Context, _args: Vec<String>) -> Program {
    async move {
        ctx.clear();
        Ok(())
    }
    .boxed_local()
}

fn echo(ctx: Context, args: Vec<String>) -> Program {
    async move { ctx.print(&format!("{}\r\n", args.join(" "))).await }.boxed_local()
}

fn did_you_mean(ctx: Context, name: &'static str, suggestion: &'static str) -> Program {
    async move {
        ctx.print(&format!(
            "{}: command not found. Did you mean '{}'?\r\n",
            name, suggestion
        ))
        .await
    }
    .boxed_local()
}

fn emacs(ctx: Context, _args: Vec<String>) -> Program {
    did_you_mean(ctx, "emacs", "vim")
}

fn nvim(ctx: Context, _args: Vec<String>) -> Program {
    did_you_mean(ctx, "nvim", "emacs")
}

fn vi(ctx: Context, _args: Vec<String>) -> Program {
    did_you_mean(ctx, "vi", "emacs")
}

fn vim(ctx: Context, _args: Vec<String>) -> Program {
    did_you_mean(ctx, "vim", "emacs")
}

/// Asks for confirmation with one more REALLY each time, forever
fn exit(ctx: Context, _args: Vec<String>) -> Program {
    async move {
        let mut really = 0;
        loop {
            ctx.print(&format!(
                "Are you {}sure you want to exit? (y/N) ",
                "REALLY ".repeat(really)
            ))
            .await?;
            let answer = ctx.read_line(ReadOptions::default()).await?;
            if !answer.trim().eq_ignore_ascii_case("y") {
                return ctx.print("Exit cancelled.\r\n").await;
            }
            really += 1;
        }
    }
    .boxed_local()
}

fn hello(ctx: Context, args: Vec<String>) -> Program {
    async move {
        if !args.is_empty() {
            return ctx
                .print(&format!("Hello {} to you too!\r\n", args.join(" ")))
                .await;
        }

        ctx.print("Hi! What is your name?\r\nResponse: ").await?;
        let answer = ctx.read_line(ReadOptions::default()).await?;
        let mut name = answer.trim().to_string();
        if name.is_empty() {
            ctx.print("You didn't tell me your name, so I will call you 'Anonymous'.\r\n")
                .await?;
            name = "Anonymous".into();
        }
        ctx.print(&format!("Hello, {}!\r\n", name)).await
    }
    .boxed_local()
}

fn help(ctx: Context, args: Vec<String>) -> Program {
    async move {
        match args.as_slice() {
            [] => {
                ctx.print("Available commands:\r\n").await?;
                for name in ctx.commands().visible() {
                    ctx.print(&format!("- {}\r\n", name)).await?;
                }
                ctx.print("Type 'help [command]' for more information on a specific command.\r\n")
                    .await
            }
            [name] => match ctx.commands().help(name) {
                HelpEntry::Text(text) => ctx.print(&format!("{}\r\n", text)).await,
                HelpEntry::Undocumented => {
                    ctx.print(&format!(
                        "idk what this command does...\r\njust type '{}' and see what happens i guess\r\n",
                        name
                    ))
                    .await
                }
                HelpEntry::Unavailable => {
                    ctx.print("help is not available for this command.\r\n").await
                }
            },
            _ => Ok(()),
        }
    }
    .boxed_local()
}

const LOGO: [&str; 14] = [
    "     .                            ",
    " .#@##%@+.                        ",
    ":@+.   .@%:                       ",
    "-@:     *@@=                      ",
    ".#@-. .+@=:%#.                    ",
    "  :+@@%=.  .+@=                   ",
    "       ......-@+........          ",
    "      .+#######%@%######-         ",
    "                =@=      ..       ",
    "                 :%#. :@@#+%@+    ",
    "                  .*@+@=    :%#   ",
    "                    -@@.     #@   ",
    "                     .#@-..:*@:   ",
    "                       :+##*-.    ",
];

fn palette(codes: std::ops::RangeInclusive<u8>) -> String {
    codes.map(|code| format!("\x1b[{}m██", code)).collect()
}

/// The neofetch screen: logo on the left, fake system facts on the right
pub fn neofetch_text(owner: &str, hostname: &str) -> String {
    let os = format!("{} OS", hostname);
    let facts: [(&str, &str); 9] = [
        ("OS", os.as_str()),
        ("Host", "github.io"),
        ("Kernel", "corn"),
        ("Uptime", "18yrs"),
        ("Shell", "shush"),
        ("CPU", "Human(R) brain(TM)"),
        ("GPU", "Human(R) brain(TM) [Integrated]"),
        ("Memory", "Healthy, no Alzheimer's"),
        ("Locale", "International"),
    ];

    let mut out = String::new();
    for (row, logo) in LOGO.iter().enumerate() {
        out.push_str(GREEN);
        out.push_str(logo);
        match row {
            0 => {
                out.push_str(owner);
                out.push_str(RESET);
            }
            1 => {
                out.push_str(RESET);
                out.push_str(&"-".repeat(owner.chars().count()));
            }
            2..=10 => {
                let (label, value) = facts[row - 2];
                out.push_str(&format!("{}{}: {}", label, RESET, value));
            }
            11 => out.push_str(RESET),
            12 => {
                out.push_str(&palette(30..=37));
                out.push_str(RESET);
            }
            _ => {
                out.push_str(&palette(90..=97));
                out.push_str(RESET);
            }
        }
        out.push_str("\r\n");
    }
    out
}

fn neofetch(ctx: Context, _args: Vec<String>) -> Program {
    async move {
        let text = neofetch_text(&ctx.config().owner, &ctx.config().hostname);
        ctx.print(&text).await
    }
    .boxed_local()
}

fn no(ctx: Context, _args: Vec<String>) -> Program {
    async move { ctx.print("no u\r\n").await }.boxed_local()
}

const GUESSABLE_PASSWORDS: [&str; 3] = ["password", "123456", "0x0c5cbae8"];

fn sudo(ctx: Context, _args: Vec<String>) -> Program {
    async move {
        ctx.print("[sudo] password for user: ").await?;
        let password = ctx.read_line(ReadOptions::hidden()).await?;
        if GUESSABLE_PASSWORDS.contains(&password.as_str()) {
            ctx.print(&format!(
                "You really thought I would set my password to '{}'? Try harder next time.\r\n",
                password
            ))
            .await
        } else {
            ctx.print("Password incorrect, permission denied. This incident will be reported to your mom.\r\n")
                .await
        }
    }
    .boxed_local()
}

/// Prints forever; only an interrupt stops it
fn yes(ctx: Context, _args: Vec<String>) -> Program {
    async move {
        loop {
            ctx.print("yes\r\n").await?;
            ctx.sleep(100).await?;
        }
    }
    .boxed_local()
}
