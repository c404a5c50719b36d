/// One blank-line delimited block of a statement export
///
/// The lines of a section are trimmed and never blank. The first line is the
/// title of the block, e.g. the category of the holdings listed below it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    lines: Vec<String>,
}

impl Section {
    /// All lines of the section, including the title
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The first line of the section
    pub fn title(&self) -> &str {
        // sections are only ever built from at least one line
        &self.lines[0]
    }
}

/// Splits the contents of a statement into its sections
///
/// Lines end at `\n`, `\r\n` or a lone `\r`. Any line that is empty after
/// trimming ends the current section. Runs of blank lines collapse into a
/// single boundary, so no empty section is ever returned. This never fails.
pub fn split_sections(contents: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Vec::new();

    let contents = contents.replace("\r\n", "\n");
    for line in contents.split(['\n', '\r']) {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                sections.push(Section { lines: std::mem::take(&mut current) });
            }
        } else {
            current.push(line.to_owned());
        }
    }

    if !current.is_empty() {
        sections.push(Section { lines: current });
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(sections: &[Section]) -> Vec<Vec<&str>> {
        sections
            .iter()
            .map(|section| section.lines().iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn splits_on_blank_lines() {
        let sections = split_sections("a\nb\n\nc\n");
        assert_eq!(lines(&sections), vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(sections[1].title(), "c");
    }

    #[test]
    fn collapses_blank_runs() {
        let sections = split_sections("\n\n  \na\n\n \t\n\nb\n\n\n");
        assert_eq!(lines(&sections), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn keeps_last_section_without_trailing_blank() {
        let sections = split_sections("a\n\nb\nc");
        assert_eq!(lines(&sections), vec![vec!["a"], vec!["b", "c"]]);
    }

    #[test]
    fn trims_lines() {
        let sections = split_sections("  title  \r\n\tx,y\r\n\u{3000}\r\nz");
        assert_eq!(lines(&sections), vec![vec!["title", "x,y"], vec!["z"]]);
    }

    #[test]
    fn splits_on_carriage_returns() {
        let sections = split_sections("a\rb\r\rc\r\nd\r\n\r\ne");
        assert_eq!(lines(&sections), vec![vec!["a", "b"], vec!["c", "d"], vec!["e"]]);
    }

    #[test]
    fn empty_input() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("\n \n\t\n").is_empty());
    }

    #[test]
    fn resplitting_is_stable() {
        let input = "\n head \n1,2\n\n\n\nfoo\nbar\n  \nbaz";
        let sections = split_sections(input);
        let joined = sections
            .iter()
            .map(|section| section.lines().join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n");

        assert_eq!(split_sections(&joined), sections);
    }
}
