// canvasdel-cli/src/main.rs
use std::path::PathBuf;

use canvasdel_core::{
    BusNotifier, CanvasStore, DeleteCommand, DeletionQueue, EditorConfig, EventBus,
    InMemoryStore, LayoutSystem, TabChildRequest, WidgetId, WidgetTree,
};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: canvasdel <document.json> <command> [options]

Commands:
  delete <id> [--parent=<id>] [--shortcut] [--no-undo]
  delete-selected <id,id,...> [--no-undo]
  delete-tab <widget-id> <index> <label>

Options:
  --layout=fixed|auto|constraint   override the configured layout system";

#[derive(Debug, PartialEq)]
struct Invocation {
    document: PathBuf,
    command: DeleteCommand,
    selection: Vec<WidgetId>,
    layout: Option<LayoutSystem>,
}

fn parse_args<I>(args: I) -> Result<Invocation, String>
where
    I: IntoIterator<Item = String>,
{
    let mut positional = Vec::new();
    let mut parent = None;
    let mut shortcut = false;
    let mut no_undo = false;
    let mut layout = None;

    for arg in args {
        if let Some(value) = arg.strip_prefix("--parent=") {
            parent = Some(WidgetId::from(value));
        } else if let Some(value) = arg.strip_prefix("--layout=") {
            layout = Some(value.parse::<LayoutSystem>().map_err(|e| e.to_string())?);
        } else if arg == "--shortcut" {
            shortcut = true;
        } else if arg == "--no-undo" {
            no_undo = true;
        } else if arg.starts_with("--") {
            return Err(format!("Unknown option '{}'", arg));
        } else {
            positional.push(arg);
        }
    }

    let mut positional = positional.into_iter();
    let document = positional
        .next()
        .map(PathBuf::from)
        .ok_or("Missing document path")?;
    let command_name = positional.next().ok_or("Missing command")?;
    let rest: Vec<String> = positional.collect();

    let mut selection = Vec::new();
    let command = match (command_name.as_str(), rest.as_slice()) {
        ("delete", [id]) => DeleteCommand::Delete {
            widget_id: Some(WidgetId::from(id.as_str())),
            parent_id: parent,
            disallow_undo: no_undo,
            is_shortcut: shortcut,
        },
        ("delete-selected", [ids]) => {
            selection = ids
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(WidgetId::from)
                .collect();
            DeleteCommand::DeleteSelected {
                disallow_undo: no_undo,
            }
        }
        ("delete-tab", [widget_id, index, label]) => {
            let index = index
                .parse::<usize>()
                .map_err(|_| format!("Tab index '{}' is not a number", index))?;
            DeleteCommand::DeleteTabChild(TabChildRequest::new(
                widget_id.as_str(),
                index,
                label.as_str(),
            ))
        }
        (name @ ("delete" | "delete-selected" | "delete-tab"), _) => {
            return Err(format!("Wrong number of arguments for '{}'", name));
        }
        (other, _) => return Err(format!("Unknown command '{}'", other)),
    };

    Ok(Invocation {
        document,
        command,
        selection,
        layout,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config
    let config = EditorConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}. Using default.", e);
        EditorConfig::default()
    });

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let invocation =
        parse_args(std::env::args().skip(1)).map_err(|e| format!("{}\n\n{}", e, USAGE))?;

    let document = std::fs::read_to_string(&invocation.document)?;
    let tree = WidgetTree::from_json(&document)?;
    tracing::info!(
        document = %invocation.document.display(),
        widgets = tree.len(),
        "loaded canvas document"
    );

    let mut store = InMemoryStore::from_config(tree, &config).with_selection(invocation.selection);
    if let Some(layout) = invocation.layout {
        store = store.with_layout_system(layout);
    }

    // Collect everything the workflow tells the editor
    let bus = EventBus::new();
    let (_subscription, events) = bus.subscribe("*");

    let queue = DeletionQueue::spawn(store, BusNotifier::new(bus))?;
    let state = queue.run(invocation.command)?;
    let store = queue.shutdown()?;

    let notifications = events
        .try_iter()
        .map(|event| serde_json::to_value(&*event.notification))
        .collect::<Result<Vec<_>, _>>()?;

    let report = serde_json::json!({
        "state": state.to_string(),
        "notifications": notifications,
        "document": store.widgets(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_delete_with_flags() {
        let invocation =
            parse_args(args("page.json delete w1 --parent=root --shortcut --layout=auto")).unwrap();
        assert_eq!(invocation.document, PathBuf::from("page.json"));
        assert_eq!(invocation.layout, Some(LayoutSystem::Auto));
        assert_eq!(
            invocation.command,
            DeleteCommand::Delete {
                widget_id: Some("w1".into()),
                parent_id: Some("root".into()),
                disallow_undo: false,
                is_shortcut: true,
            }
        );
    }

    #[test]
    fn test_parse_delete_selected_sets_selection() {
        let invocation = parse_args(args("page.json delete-selected a,b,,c --no-undo")).unwrap();
        assert_eq!(
            invocation.selection,
            vec![WidgetId::from("a"), WidgetId::from("b"), WidgetId::from("c")]
        );
        assert_eq!(
            invocation.command,
            DeleteCommand::DeleteSelected {
                disallow_undo: true
            }
        );
    }

    #[test]
    fn test_parse_delete_tab() {
        let invocation = parse_args(args("page.json delete-tab canvas2 1 Settings")).unwrap();
        assert_eq!(
            invocation.command,
            DeleteCommand::DeleteTabChild(TabChildRequest::new("canvas2", 1, "Settings"))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(args("page.json")).is_err());
        assert!(parse_args(args("page.json delete")).is_err());
        assert!(parse_args(args("page.json delete-tab c1 one Tab")).is_err());
        assert!(parse_args(args("page.json explode w1")).is_err());
        assert!(parse_args(args("page.json delete w1 --layout=grid")).is_err());
        assert!(parse_args(args("page.json delete w1 --force")).is_err());
    }
}
