/// Where the raw query was typed. `c` and `n` are only commands in the omnibox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Popup,
    Omnibox,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceFlag {
    /// `-g`: no space restriction.
    Global,
    /// `-l`: space of the most recently accessed Confluence tab.
    LastAccessed,
    /// `-s` with nothing after it: the stored space key.
    Settings,
    /// `-s KEY`: explicit key(s).
    Override(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub raw: String,
    pub space_flag: Option<SpaceFlag>,
    pub quick_open: bool,
    pub create_page: bool,
    pub navigate: bool,
    pub labels: Vec<String>,
    /// Remaining words joined by single spaces. Runs of whitespace inside the text are
    /// not kept, so `"release  notes"` searches for `"release notes"`.
    pub free_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Global,
    Last,
    Space,
    Open,
    Create,
    Navigate,
}

impl ParsedQuery {
    pub fn parse(query: &str, surface: Surface) -> Self {
        let raw = query.to_string();
        let tokens: Vec<&str> = query.split_whitespace().collect();

        let mut global = false;
        let mut last = false;
        let mut space: Option<SpaceFlag> = None;
        let mut quick_open = false;
        let mut create_page = false;
        let mut navigate = false;
        let mut labels = Vec::new();
        let mut free_terms: Vec<&str> = Vec::new();

        let mut index = 0;
        while index < tokens.len() {
            let token = tokens[index];
            index += 1;

            if let Some(flag) = parse_flag(token, surface) {
                match flag {
                    Flag::Global => global = true,
                    Flag::Last => last = true,
                    Flag::Open => quick_open = true,
                    Flag::Create => create_page = true,
                    Flag::Navigate => navigate = true,
                    Flag::Space => {
                        let key = tokens
                            .get(index)
                            .copied()
                            .filter(|next| is_plain_term(next, surface));
                        let flag = match key {
                            Some(key) => {
                                index += 1;
                                SpaceFlag::Override(key.to_string())
                            }
                            None => SpaceFlag::Settings,
                        };
                        if space.is_none() {
                            space = Some(flag);
                        }
                    }
                }
                continue;
            }

            if let Some(position) = token.find('#') {
                let (prefix, label) = token.split_at(position);
                if !prefix.is_empty() {
                    free_terms.push(prefix);
                }
                let label = &label[1..];
                if !label.is_empty() {
                    labels.push(label.to_string());
                }
                continue;
            }

            free_terms.push(token);
        }

        let space_flag = if global {
            Some(SpaceFlag::Global)
        } else if last {
            Some(SpaceFlag::LastAccessed)
        } else {
            space
        };

        Self {
            raw,
            space_flag,
            quick_open,
            create_page,
            navigate,
            labels,
            free_text: free_terms.join(" "),
        }
    }
}

fn parse_flag(token: &str, surface: Surface) -> Option<Flag> {
    let letter = token.strip_prefix('-').unwrap_or(token);
    match letter {
        "g" => Some(Flag::Global),
        "l" => Some(Flag::Last),
        "s" => Some(Flag::Space),
        "o" => Some(Flag::Open),
        "c" if surface == Surface::Omnibox => Some(Flag::Create),
        "n" if surface == Surface::Omnibox => Some(Flag::Navigate),
        _ => None,
    }
}

fn is_plain_term(token: &str, surface: Surface) -> bool {
    parse_flag(token, surface).is_none() && !token.contains('#')
}
