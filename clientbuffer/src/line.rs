//! Attribution of raw protocol lines to the channel or nick they concern.
//!
//! This is deliberately not a full message parser: it only needs to find the
//! command and the one parameter naming the target, and it must accept
//! anything the relay might send or receive without failing.

use crate::config::ParserConfig;

/// The command and target of a line that concerns a specific channel or nick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressedLine<'a> {
    pub command: &'a str,
    pub target: &'a str,
}

impl AddressedLine<'_> {
    pub fn is_command(&self, command: &str) -> bool {
        self.command.eq_ignore_ascii_case(command)
    }
}

/// Splits the parameter section of a line. A parameter beginning with `:`
/// is the trailing parameter and takes the rest of the line.
struct Parameters<'a> {
    rest: &'a str,
    done: bool,
}

impl<'a> Parameters<'a> {
    fn new(rest: &'a str) -> Self {
        Self { rest, done: false }
    }
}

impl<'a> Iterator for Parameters<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.done {
            return None;
        }

        let rest = self.rest.trim_start_matches(' ');
        if rest.is_empty() {
            self.done = true;
            return None;
        }

        if let Some(trailing) = rest.strip_prefix(':') {
            self.done = true;
            return Some(trailing);
        }

        match rest.split_once(' ') {
            Some((arg, after)) => {
                self.rest = after;
                Some(arg)
            }
            None => {
                self.done = true;
                Some(rest)
            }
        }
    }
}

fn is_numeric(command: &str) -> bool {
    command.len() == 3 && command.bytes().all(|b| b.is_ascii_digit())
}

/// Skip a leading `@tags` or `:prefix` word and the spaces after it.
/// Returns `None` if nothing follows the word.
fn skip_word(raw: &str, marker: char) -> Option<&str> {
    if !raw.starts_with(marker) {
        return Some(raw);
    }
    let (_, rest) = raw.split_once(' ')?;
    Some(rest.trim_start_matches(' '))
}

#[derive(Clone, Debug, Default)]
pub struct LineParser {
    config: ParserConfig,
}

impl LineParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Find the command and target of `raw`.
    ///
    /// Accepts lines with or without message tags and with or without a
    /// source prefix. Returns `None` for commands that aren't addressed to a
    /// target, and for anything malformed.
    pub fn parse<'a>(&self, raw: &'a str) -> Option<AddressedLine<'a>> {
        let raw = raw.trim_end_matches(['\r', '\n']).trim_start();
        let raw = skip_word(raw, '@')?;
        let raw = skip_word(raw, ':')?;

        let (command, params) = raw.split_once(' ').unwrap_or((raw, ""));
        if command.is_empty() {
            return None;
        }

        let index = if is_numeric(command) {
            self.config.numeric_target(command)
        } else if self.config.is_target_command(command) {
            0
        } else {
            return None;
        };

        let target = Parameters::new(params).nth(index)?;
        let target = target.strip_prefix(':').unwrap_or(target);
        if target.is_empty() {
            return None;
        }

        Some(AddressedLine { command, target })
    }
}

/// Parse with the default command and numeric tables
pub fn parse(raw: &str) -> Option<AddressedLine<'_>> {
    LineParser::default().parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_of(raw: &str) -> Option<&str> {
        parse(raw).map(|l| l.target)
    }

    #[test]
    fn client_origin() {
        let line = parse("PRIVMSG #chan :hi").unwrap();
        assert_eq!(line.command, "PRIVMSG");
        assert_eq!(line.target, "#chan");
    }

    #[test]
    fn server_prefixed() {
        let line = parse(":nick!user@host PRIVMSG #chan :hello there").unwrap();
        assert_eq!(line.command, "PRIVMSG");
        assert_eq!(line.target, "#chan");
    }

    #[test]
    fn tags_and_prefix() {
        let line = parse("@time=2024-01-01T00:00:00.000Z;msgid=abc :nick!u@h NOTICE nick :x");
        assert_eq!(line.map(|l| l.target), Some("nick"));
    }

    #[test]
    fn trailing_target() {
        assert_eq!(target_of(":nick!u@h JOIN :#chan"), Some("#chan"));
        assert_eq!(target_of("JOIN #chan"), Some("#chan"));
    }

    #[test]
    fn case_insensitive_commands() {
        let line = parse("privmsg #chan :hi").unwrap();
        assert!(line.is_command("PRIVMSG"));
        assert_eq!(line.target, "#chan");
        assert_eq!(target_of("Topic #chan :new"), Some("#chan"));
    }

    #[test]
    fn every_target_command() {
        assert_eq!(target_of(":n!u@h PART #chan :bye"), Some("#chan"));
        assert_eq!(target_of(":n!u@h MODE #chan +o other"), Some("#chan"));
        assert_eq!(target_of(":n!u@h KICK #chan other :reason"), Some("#chan"));
    }

    #[test]
    fn names_reply() {
        assert_eq!(target_of(":server 353 nick = #chan :a b c"), Some("#chan"));
    }

    #[test]
    fn other_numerics() {
        assert_eq!(target_of(":server 301 nick target :msg"), Some("target"));
        assert_eq!(target_of(":server 332 nick #chan :the topic"), Some("#chan"));
        assert_eq!(target_of(":server 366 nick #chan :End of /NAMES list."), Some("#chan"));
    }

    #[test]
    fn numeric_without_enough_parameters() {
        assert_eq!(target_of(":server 001 nick"), None);
        assert_eq!(target_of(":server 353 nick ="), None);
    }

    #[test]
    fn configured_numerics() {
        let mut config = ParserConfig::default();
        config.numeric_targets.insert("329".to_string(), 1);
        config.numeric_targets.insert("324".to_string(), 2);
        let parser = LineParser::new(config);

        assert_eq!(
            parser.parse(":server 324 nick #chan +nt").map(|l| l.target),
            Some("+nt")
        );
        assert_eq!(
            parser.parse(":server 353 nick = #chan :a").map(|l| l.target),
            Some("#chan")
        );
    }

    #[test]
    fn untargeted_commands() {
        assert_eq!(parse("PING :server"), None);
        assert_eq!(parse(":nick!u@h QUIT :gone"), None);
        assert_eq!(parse(":nick!u@h NICK newnick"), None);
        assert_eq!(parse("CAP LS 302"), None);
    }

    #[test]
    fn malformed() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
        assert_eq!(parse("@tags-only"), None);
        assert_eq!(parse(":prefix-only"), None);
        assert_eq!(parse("@tags :prefix"), None);
        assert_eq!(parse("PRIVMSG"), None);
        assert_eq!(parse("PRIVMSG :"), None);
        assert_eq!(parse("PRIVMSG  "), None);
        assert_eq!(
            parse(": PRIVMSG #chan"),
            Some(AddressedLine {
                command: "PRIVMSG",
                target: "#chan"
            })
        );
    }

    #[test]
    fn line_endings() {
        assert_eq!(target_of("PRIVMSG #chan :hi\r\n"), Some("#chan"));
        assert_eq!(target_of("JOIN #chan\r\n"), Some("#chan"));
    }

    #[test]
    fn double_spaces() {
        assert_eq!(target_of(":n!u@h  PRIVMSG   #chan  :hi"), Some("#chan"));
        assert_eq!(target_of("@a=b   PRIVMSG #chan :hi"), Some("#chan"));
    }

    #[test]
    fn idempotent() {
        let raw = ":server 353 nick @ #chan :a b";
        assert_eq!(parse(raw), parse(raw));
    }
}
