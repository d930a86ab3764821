pub use anstream::println as aprintln;

/// Tokyo Night color palette
pub mod colors {
    pub const RESET: &str = "\x1b[0m";

    pub const TKN_RED: &str = "\x1b[38;2;247;118;142m"; // #f7768e
    pub const TKN_GREEN: &str = "\x1b[38;2;158;206;106m"; // #9ece6a
    pub const TKN_YELLOW: &str = "\x1b[38;2;224;175;104m"; // #e0af68
    pub const TKN_BLUE: &str = "\x1b[38;2;122;162;247m"; // #7aa2f7
    pub const TKN_CYAN: &str = "\x1b[38;2;125;207;255m"; // #7dcfff
}

fn paint(color: &str, text: &str) -> String {
    format!("{color}{text}{}", colors::RESET)
}

pub fn p_g(text: &str) -> String {
    paint(colors::TKN_GREEN, text)
}

pub fn p_r(text: &str) -> String {
    paint(colors::TKN_RED, text)
}

pub fn p_y(text: &str) -> String {
    paint(colors::TKN_YELLOW, text)
}

pub fn p_b(text: &str) -> String {
    paint(colors::TKN_BLUE, text)
}

pub fn p_c(text: &str) -> String {
    paint(colors::TKN_CYAN, text)
}

/// Colors a plan or summary line by its leading marker.
pub fn paint_line(line: &str) -> String {
    match line.chars().next() {
        Some('+') => p_g(line),
        Some('-') | Some('!') => p_r(line),
        Some('~') => p_y(line),
        Some('=') => p_c(line),
        _ => line.to_string(),
    }
}

/// Prints `lines` under a blue title. Colors are stripped when stdout is not
/// a terminal.
pub fn print_section(title: &str, lines: &[String]) {
    aprintln!("{}", p_b(title));
    for line in lines {
        aprintln!("  {}", paint_line(line));
    }
    aprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_line_by_marker() {
        assert_eq!(paint_line("+ 1. create users"), p_g("+ 1. create users"));
        assert_eq!(paint_line("- 1. drop users"), p_r("- 1. drop users"));
        assert_eq!(paint_line("! null keys in users"), p_r("! null keys in users"));
        assert_eq!(paint_line("~ 1. copy staging_songs"), p_y("~ 1. copy staging_songs"));
        assert_eq!(paint_line("= run succeeded"), p_c("= run succeeded"));
        assert_eq!(paint_line("    DROP TABLE"), "    DROP TABLE");
    }
}
