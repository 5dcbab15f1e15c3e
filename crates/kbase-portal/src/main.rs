use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use kbase_access::{Action, ActionSet, Role};
use kbase_portal::{Header, Page, Portal, Session};
use kbase_store::{import_legacy, FontFamily, PortalConfig};
use kbase_tree::TopicPath;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .required(true)
        .value_parser(value_parser!(TopicPath))
        .help(help)
}

fn build_cli() -> Command {
    Command::new("kbase")
        .version(kbase_portal::VERSION)
        .about("Knowledge-base portal")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .env("KBASE_CONFIG")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML config file"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .env("KBASE_DATA")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Data directory; overrides the config file"),
        )
        .arg(
            Arg::new("user")
                .short('u')
                .long("user")
                .env("KBASE_USER")
                .global(true)
                .help("Account to act as"),
        )
        .arg(
            Arg::new("password")
                .short('p')
                .long("password")
                .env("KBASE_PASSWORD")
                .hide_env_values(true)
                .global(true)
                .help("Password for --user"),
        )
        .subcommand(Command::new("init").about("Create the data directory and its documents"))
        .subcommand(Command::new("tree").about("Print the topics you can see"))
        .subcommand(
            Command::new("show")
                .about("Render one topic")
                .arg(path_arg("path", "Topic path, e.g. 'Billing / UPI'; empty for home"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Search topic names and content")
                .arg(Arg::new("query").required(true)),
        )
        .subcommand(
            Command::new("add")
                .about("Create a subtopic")
                .arg(path_arg("parent", "Parent topic"))
                .arg(Arg::new("name").required(true))
                .arg(Arg::new("icon").long("icon").help("Icon shown next to the topic")),
        )
        .subcommand(
            Command::new("rename")
                .about("Rename a subtopic")
                .arg(path_arg("parent", "Parent topic"))
                .arg(Arg::new("old").required(true))
                .arg(Arg::new("new").required(true)),
        )
        .subcommand(
            Command::new("remove")
                .about("Delete a subtopic and everything under it")
                .arg(path_arg("parent", "Parent topic"))
                .arg(Arg::new("name").required(true)),
        )
        .subcommand(
            Command::new("set-content")
                .about("Replace a topic's content")
                .arg(path_arg("path", "Topic"))
                .arg(Arg::new("text").long("text").conflicts_with("file"))
                .arg(
                    Arg::new("file")
                        .long("file")
                        .value_parser(value_parser!(PathBuf))
                        .help("Read the content from a file"),
                ),
        )
        .subcommand(
            Command::new("attach")
                .about("Upload a file to a topic")
                .arg(path_arg("path", "Topic"))
                .arg(Arg::new("file").required(true).value_parser(value_parser!(PathBuf))),
        )
        .subcommand(
            Command::new("detach")
                .about("Delete a file from a topic")
                .arg(path_arg("path", "Topic"))
                .arg(Arg::new("name").required(true)),
        )
        .subcommand(
            Command::new("grant")
                .about("Replace a user's grant on a topic; no flags revokes it")
                .arg(Arg::new("target").required(true).help("User receiving the grant"))
                .arg(path_arg("path", "Topic"))
                .arg(Arg::new("view").long("view").action(ArgAction::SetTrue))
                .arg(Arg::new("edit").long("edit").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("check")
                .about("Ask whether a user may perform an action")
                .arg(Arg::new("target").required(true))
                .arg(path_arg("path", "Topic"))
                .arg(Arg::new("action").required(true).value_parser(value_parser!(Action))),
        )
        .subcommand(
            Command::new("user")
                .about("Manage accounts")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("new-password").required(true))
                        .arg(
                            Arg::new("role")
                                .long("role")
                                .default_value("User")
                                .value_parser(value_parser!(Role)),
                        ),
                )
                .subcommand(Command::new("remove").arg(Arg::new("name").required(true)))
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("passwd")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("new-password").required(true)),
                )
                .subcommand(
                    Command::new("role")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("role").required(true).value_parser(value_parser!(Role))),
                ),
        )
        .subcommand(
            Command::new("announce")
                .about("Manage announcements")
                .subcommand_required(true)
                .subcommand(Command::new("post").arg(Arg::new("text").required(true)))
                .subcommand(
                    Command::new("remove").arg(
                        Arg::new("number")
                            .required(true)
                            .value_parser(value_parser!(usize))
                            .help("Position as shown by 'announce list', starting at 1"),
                    ),
                )
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("order")
                .about("Set the display order of a topic's children")
                .arg(path_arg("parent", "Parent topic; empty for home"))
                .arg(Arg::new("names").num_args(1..).required(true)),
        )
        .subcommand(
            Command::new("visibility")
                .about("Show or hide a top-level topic")
                .arg(Arg::new("topic").required(true))
                .arg(
                    Arg::new("visible")
                        .required(true)
                        .value_parser(value_parser!(bool))
                        .help("true or false"),
                ),
        )
        .subcommand(
            Command::new("display")
                .about("Change display settings")
                .arg(Arg::new("reset").long("reset").action(ArgAction::SetTrue))
                .arg(Arg::new("font-size").long("font-size").value_parser(value_parser!(u8)))
                .arg(
                    Arg::new("font-family")
                        .long("font-family")
                        .value_parser(value_parser!(FontFamily)),
                )
                .arg(Arg::new("background-color").long("background-color"))
                .arg(Arg::new("font-color").long("font-color"))
                .arg(Arg::new("default-icon").long("default-icon"))
                .arg(Arg::new("title").long("title"))
                .arg(Arg::new("show-title").long("show-title").value_parser(value_parser!(bool)))
                .arg(Arg::new("show-logo").long("show-logo").value_parser(value_parser!(bool)))
                .arg(Arg::new("hide-header").long("hide-header").value_parser(value_parser!(bool)))
                .arg(Arg::new("announcements").long("announcements").value_parser(value_parser!(bool)))
                .arg(Arg::new("editor-tools").long("editor-tools").value_parser(value_parser!(bool)))
                .arg(Arg::new("user-management").long("user-management").value_parser(value_parser!(bool)))
                .arg(Arg::new("settings-menu").long("settings-menu").value_parser(value_parser!(bool))),
        )
        .subcommand(
            Command::new("logo")
                .about("Upload and select a header logo")
                .arg(Arg::new("file").required(true).value_parser(value_parser!(PathBuf))),
        )
        .subcommand(
            Command::new("import-legacy")
                .about("Convert a legacy data directory into the configured one")
                .arg(Arg::new("source").required(true).value_parser(value_parser!(PathBuf))),
        )
}

fn load_config(matches: &ArgMatches) -> Result<PortalConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => PortalConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => PortalConfig::new(),
    };
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config = config.with_data_dir(dir);
    }
    Ok(config)
}

fn login(portal: &Portal, matches: &ArgMatches) -> Result<Session> {
    let Some(user) = matches.get_one::<String>("user") else {
        bail!("--user (or KBASE_USER) is required for this command");
    };
    let password = matches.get_one::<String>("password").map_or("", String::as_str);
    Ok(portal.login(user, password)?)
}

fn file_name(path: &std::path::Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))
}

fn print_page(page: &Page) {
    match &page.header {
        Header::Hidden => {}
        Header::Logo(logo) => println!("[logo: {logo}]"),
        Header::Title(title) => println!("{title}"),
    }
    println!("{}", page.breadcrumb);
    if let Some(notices) = &page.announcements {
        for notice in notices {
            println!("📢 {notice}");
        }
    }
    for child in &page.children {
        println!("  {} {}", child.icon, child.name);
    }
    if !page.content.is_empty() {
        println!();
        println!("{}", page.content);
    }
    for file in &page.attachments {
        let kind = if file.is_image { "image" } else { "file" };
        println!("  📎 {} ({kind}, {} bytes)", file.name, file.size);
    }
    if page.can_edit {
        println!("(editable)");
    }
}

fn print_tree(portal: &Portal, session: &mut Session, path: TopicPath, depth: usize) -> Result<()> {
    session.nav.go(path);
    let page = portal.page(session)?;
    for child in page.children {
        println!("{}{} {}", "  ".repeat(depth), child.icon, child.name);
        print_tree(portal, session, child.path, depth + 1)?;
    }
    Ok(())
}

fn update_display(portal: &mut Portal, session: &Session, args: &ArgMatches) -> Result<()> {
    if args.get_flag("reset") {
        portal.reset_display(session)?;
        println!("display settings reset");
        return Ok(());
    }
    let string = |name: &str| args.get_one::<String>(name).cloned();
    let flag = |name: &str| args.get_one::<bool>(name).copied();
    portal.update_display(session, |display| {
        let appearance = &mut display.appearance;
        if let Some(size) = args.get_one::<u8>("font-size") {
            appearance.set_font_size(*size);
        }
        if let Some(family) = args.get_one::<FontFamily>("font-family") {
            appearance.font_family = *family;
        }
        if let Some(color) = string("background-color") {
            appearance.background_color = color;
        }
        if let Some(color) = string("font-color") {
            appearance.font_color = color;
        }
        if let Some(icon) = string("default-icon") {
            appearance.default_icon = icon;
        }

        let header = &mut display.header;
        if let Some(title) = string("title") {
            header.header_title = title;
        }
        if let Some(show) = flag("show-title") {
            header.show_title = show;
        }
        if let Some(show) = flag("show-logo") {
            header.show_logo = show;
        }
        if let Some(hide) = flag("hide-header") {
            header.hide_header = hide;
        }

        let toggles = &mut display.feature_toggles;
        for (name, slot) in [
            ("announcements", &mut toggles.announcements),
            ("editor-tools", &mut toggles.editor_tools),
            ("user-management", &mut toggles.user_management),
            ("settings-menu", &mut toggles.settings_menu),
        ] {
            if let Some(on) = flag(name) {
                *slot = on;
            }
        }
    })?;
    println!("display settings saved");
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            let portal = Portal::init(config)?;
            println!("initialized {}", portal.config().data_dir.display());
            return Ok(());
        }
        Some(("import-legacy", args)) => {
            let source = args.get_one::<PathBuf>("source").context("source is required")?;
            let report = import_legacy(source, &config)?;
            println!(
                "imported {} topics, {} users, {} announcements, {} attachments",
                report.topics, report.users, report.announcements, report.attachments
            );
            for warning in &report.warnings {
                println!("  warning: {warning}");
            }
            return Ok(());
        }
        Some(("check", args)) => {
            let portal = Portal::open(config)?;
            let target = args.get_one::<String>("target").context("user is required")?;
            let path = args.get_one::<TopicPath>("path").context("path is required")?;
            let action = *args.get_one::<Action>("action").context("action is required")?;
            let allowed = portal.check(target, path, action);
            println!("{}", if allowed { "allowed" } else { "denied" });
            return Ok(());
        }
        _ => {}
    }

    let mut portal = Portal::open(config)?;
    let mut session = login(&portal, matches)?;
    let path = |args: &ArgMatches, name: &str| -> Result<TopicPath> {
        args.get_one::<TopicPath>(name)
            .cloned()
            .with_context(|| format!("{name} is required"))
    };
    let string = |args: &ArgMatches, name: &str| -> Result<String> {
        args.get_one::<String>(name)
            .cloned()
            .with_context(|| format!("{name} is required"))
    };

    match matches.subcommand() {
        Some(("tree", _)) => print_tree(&portal, &mut session, TopicPath::root(), 0)?,
        Some(("show", args)) => {
            session.nav.go(path(args, "path")?);
            let page = portal.page(&mut session)?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print_page(&page);
            }
        }
        Some(("search", args)) => {
            for hit in portal.search(&session, &string(args, "query")?) {
                println!("{hit}");
            }
        }
        Some(("add", args)) => {
            let icon = args.get_one::<String>("icon").map(String::as_str);
            let created = portal.add_subtopic(&session, &path(args, "parent")?, &string(args, "name")?, icon)?;
            println!("created {created}");
        }
        Some(("rename", args)) => {
            let renamed =
                portal.rename_subtopic(&session, &path(args, "parent")?, &string(args, "old")?, &string(args, "new")?)?;
            println!("renamed to {renamed}");
        }
        Some(("remove", args)) => {
            let removed = portal.remove_subtopic(&session, &path(args, "parent")?, &string(args, "name")?)?;
            println!("removed {} topics", removed.len());
        }
        Some(("set-content", args)) => {
            let text = match (args.get_one::<String>("text"), args.get_one::<PathBuf>("file")) {
                (Some(text), _) => text.clone(),
                (None, Some(file)) => {
                    std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?
                }
                (None, None) => bail!("one of --text or --file is required"),
            };
            portal.set_content(&session, &path(args, "path")?, &text)?;
            println!("content saved");
        }
        Some(("attach", args)) => {
            let file = args.get_one::<PathBuf>("file").context("file is required")?;
            let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
            let name = file_name(file)?;
            portal.attach(&session, &path(args, "path")?, &name, &bytes)?;
            println!("attached {name}");
        }
        Some(("detach", args)) => {
            portal.detach(&session, &path(args, "path")?, &string(args, "name")?)?;
            println!("deleted");
        }
        Some(("grant", args)) => {
            let mut actions = ActionSet::new();
            if args.get_flag("view") {
                actions.insert(Action::View);
            }
            if args.get_flag("edit") {
                actions.insert(Action::Edit);
            }
            let target = string(args, "target")?;
            let topic = path(args, "path")?;
            portal.grant(&session, &target, &topic, actions.clone())?;
            println!("{target} on {topic}: {actions}");
        }
        Some(("user", args)) => match args.subcommand() {
            Some(("add", args)) => {
                let role = args.get_one::<Role>("role").copied().unwrap_or_default();
                let name = string(args, "name")?;
                portal.add_user(&session, &name, &string(args, "new-password")?, role)?;
                println!("added {name} ({role})");
            }
            Some(("remove", args)) => {
                let name = string(args, "name")?;
                portal.remove_user(&session, &name)?;
                println!("removed {name}");
            }
            Some(("list", _)) => {
                for (name, role) in portal.list_users(&session)? {
                    println!("{name}\t{role}");
                }
            }
            Some(("passwd", args)) => {
                portal.change_password(&session, &string(args, "name")?, &string(args, "new-password")?)?;
                println!("password changed");
            }
            Some(("role", args)) => {
                let role = *args.get_one::<Role>("role").context("role is required")?;
                portal.set_role(&session, &string(args, "name")?, role)?;
                println!("role changed to {role}");
            }
            _ => bail!("unknown command"),
        },
        Some(("announce", args)) => match args.subcommand() {
            Some(("post", args)) => {
                if portal.post_announcement(&session, &string(args, "text")?)? {
                    println!("posted");
                } else {
                    println!("nothing to post");
                }
            }
            Some(("remove", args)) => {
                let number = *args.get_one::<usize>("number").context("number is required")?;
                let Some(index) = number.checked_sub(1) else {
                    bail!("announcements are numbered from 1");
                };
                let removed = portal.remove_announcement(&session, index)?;
                println!("removed: {removed}");
            }
            Some(("list", _)) => {
                for (i, notice) in portal.announcements().enumerate() {
                    println!("{}. {notice}", i + 1);
                }
            }
            _ => bail!("unknown command"),
        },
        Some(("order", args)) => {
            let names: Vec<String> = args
                .get_many::<String>("names")
                .map(|names| names.cloned().collect())
                .unwrap_or_default();
            portal.set_order(&session, &path(args, "parent")?, names)?;
            println!("order saved");
        }
        Some(("visibility", args)) => {
            let visible = *args.get_one::<bool>("visible").context("visible is required")?;
            portal.set_visibility(&session, &string(args, "topic")?, visible)?;
            println!("visibility saved");
        }
        Some(("display", args)) => update_display(&mut portal, &session, args)?,
        Some(("logo", args)) => {
            let file = args.get_one::<PathBuf>("file").context("file is required")?;
            let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
            let stored = portal.upload_logo(&session, &file_name(file)?, &bytes)?;
            println!("logo set to {stored}");
        }
        _ => bail!("unknown command"),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("KBASE_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();
    run(&matches)
}
