//! Line commands typed at the console prompt.

use salesdesk_core::{
    CategoryField, Moment, MutationAction, Msg, OutcomeDraft, PanelMode, Segment, SortDirection,
    SortKey, SortSpec, Status,
};

pub const HELP: &str = "\
commands:
  refresh                         fetch a fresh snapshot
  search [text]                   filter by name, company, email, phone
  filter territory|industry|owner [value]
  segment all|due|scheduled|<status>
  sort priority|name|status [asc|desc]
  pagesize <n> | more
  bulk on|off | toggle <id> | all
  status <status> [id]            change status of one record or the selection
  delete [id]
  assign [id..] | users <text> | pick <user id> | cancel
  open <id> [split] | close
  call <id> [call log id] | hangup | minimize | reopen | discard
  outcome <category> <notes..>
  dismiss <n> | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Msg),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("`{command}` needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("`{value}` is not a valid {what}")]
    InvalidArgument { value: String, what: &'static str },
}

/// Parses one input line. Blank lines map to `Msg::NoOp`.
pub fn parse(line: &str, at: Moment) -> Result<Command, ParseError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let msg = match head.to_lowercase().as_str() {
        "" => Msg::NoOp,
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        "refresh" => Msg::RefreshRequested,
        "search" => Msg::QueryChanged {
            query: rest.to_string(),
            at,
        },
        "filter" => {
            let field = args.first().ok_or(ParseError::MissingArgument {
                command: "filter",
                expected: "territory, industry or owner",
            })?;
            let field = parse_category(field)?;
            let value = rest
                .split_once(char::is_whitespace)
                .map(|(_, value)| value.trim().to_string())
                .filter(|value| !value.is_empty());
            Msg::CategoryChanged { field, value }
        }
        "segment" => Msg::SegmentChanged(parse_segment(required(&args, 0, "segment", "a segment")?)?),
        "sort" => {
            let key = parse_sort_key(required(&args, 0, "sort", "a sort key")?)?;
            let direction = match args.get(1) {
                None => SortDirection::Ascending,
                Some(value) => parse_direction(value)?,
            };
            Msg::SortChanged(SortSpec::new(key, direction))
        }
        "pagesize" => {
            let value = required(&args, 0, "pagesize", "a number")?;
            let size: usize = value.parse().map_err(|_| ParseError::InvalidArgument {
                value: value.to_string(),
                what: "page size",
            })?;
            Msg::PageSizeChanged(size)
        }
        "more" => Msg::ShowMore,
        "bulk" => match required(&args, 0, "bulk", "on or off")? {
            "on" => Msg::BulkModeEntered,
            "off" => Msg::BulkModeExited,
            other => {
                return Err(ParseError::InvalidArgument {
                    value: other.to_string(),
                    what: "bulk switch",
                })
            }
        },
        "toggle" => Msg::SelectionToggled(required(&args, 0, "toggle", "a record id")?.to_string()),
        "all" => Msg::SelectAllToggled,
        "status" => {
            let status = required(&args, 0, "status", "a status")?;
            let status = Status::normalize(status).ok_or_else(|| ParseError::InvalidArgument {
                value: status.to_string(),
                what: "status",
            })?;
            record_or_bulk(args.get(1), MutationAction::ChangeStatus { status })
        }
        "delete" => record_or_bulk(args.first(), MutationAction::Delete),
        "assign" => Msg::AssignOpened {
            ids: (!args.is_empty()).then(|| args.iter().map(|id| id.to_string()).collect()),
        },
        "users" => Msg::AssignQueryChanged(rest.to_string()),
        "pick" => Msg::AssignConfirmed {
            owner_id: required(&args, 0, "pick", "a user id")?.to_string(),
        },
        "cancel" => Msg::AssignClosed,
        "open" => {
            let id = required(&args, 0, "open", "a record id")?.to_string();
            let mode = match args.get(1) {
                Some(&"split") => PanelMode::Split,
                _ => PanelMode::Popup,
            };
            Msg::RecordOpened { id, mode }
        }
        "close" => Msg::DetailClosed,
        "call" => Msg::CallStarted {
            id: required(&args, 0, "call", "a record id")?.to_string(),
            call_log_id: args.get(1).map(|id| id.to_string()),
            at,
        },
        "hangup" => Msg::CallEnded { at },
        "minimize" => Msg::OutcomeMinimized { at },
        "reopen" => Msg::OutcomeReopened { at },
        "discard" => Msg::OutcomeDiscarded,
        "outcome" => {
            let category = required(&args, 0, "outcome", "a category")?.to_string();
            let notes = rest
                .split_once(char::is_whitespace)
                .map(|(_, notes)| notes.trim().to_string())
                .unwrap_or_default();
            Msg::OutcomeSubmitted {
                draft: OutcomeDraft { category, notes },
                at,
            }
        }
        "dismiss" => {
            let value = required(&args, 0, "dismiss", "a notice number")?;
            let index: usize = value.parse().map_err(|_| ParseError::InvalidArgument {
                value: value.to_string(),
                what: "notice number",
            })?;
            Msg::NoticeDismissed(index)
        }
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Command::Dispatch(msg))
}

fn required<'a>(
    args: &[&'a str],
    index: usize,
    command: &'static str,
    expected: &'static str,
) -> Result<&'a str, ParseError> {
    args.get(index)
        .copied()
        .ok_or(ParseError::MissingArgument { command, expected })
}

fn record_or_bulk(id: Option<&&str>, action: MutationAction) -> Msg {
    match id {
        Some(id) => Msg::RecordActionRequested {
            id: id.to_string(),
            action,
        },
        None => Msg::BulkActionRequested(action),
    }
}

fn parse_category(value: &str) -> Result<CategoryField, ParseError> {
    match value.to_lowercase().as_str() {
        "territory" => Ok(CategoryField::Territory),
        "industry" => Ok(CategoryField::Industry),
        "owner" => Ok(CategoryField::Owner),
        _ => Err(ParseError::InvalidArgument {
            value: value.to_string(),
            what: "filter field",
        }),
    }
}

fn parse_segment(value: &str) -> Result<Segment, ParseError> {
    match value.to_lowercase().as_str() {
        "all" => Ok(Segment::All),
        "due" | "action_due" => Ok(Segment::ActionDue),
        "scheduled" => Ok(Segment::Scheduled),
        other => Status::normalize(other)
            .map(Segment::Status)
            .ok_or_else(|| ParseError::InvalidArgument {
                value: value.to_string(),
                what: "segment",
            }),
    }
}

fn parse_sort_key(value: &str) -> Result<SortKey, ParseError> {
    match value.to_lowercase().as_str() {
        "priority" => Ok(SortKey::Priority),
        "name" => Ok(SortKey::Name),
        "status" => Ok(SortKey::Status),
        _ => Err(ParseError::InvalidArgument {
            value: value.to_string(),
            what: "sort key",
        }),
    }
}

fn parse_direction(value: &str) -> Result<SortDirection, ParseError> {
    match value.to_lowercase().as_str() {
        "asc" => Ok(SortDirection::Ascending),
        "desc" => Ok(SortDirection::Descending),
        _ => Err(ParseError::InvalidArgument {
            value: value.to_string(),
            what: "sort direction",
        }),
    }
}
