//! robots.txt parsing and access checks.

/// A single `Allow` or `Disallow` line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Rule {
    allow: bool,
    pattern: String,
}

/// One `User-agent` group and the rules that follow it.
#[derive(Debug, Clone, Default)]
struct RuleGroup {
    agents: Vec<String>,
    rules: Vec<Rule>,
}

impl RuleGroup {
    fn is_wildcard(&self) -> bool {
        self.agents.iter().any(|agent| agent == "*")
    }

    fn names(&self, token: &str) -> bool {
        self.agents.iter().any(|agent| agent != "*" && agent == token)
    }
}

/// Parsed robots.txt document. Immutable once parsed.
///
/// An empty rule set allows everything, which is also what a missing,
/// unreachable or unparseable robots.txt degrades to.
#[derive(Debug, Clone, Default)]
pub struct RobotsRuleSet {
    groups: Vec<RuleGroup>,
}

impl RobotsRuleSet {
    /// Parses a robots.txt body. Never fails; lines that are not
    /// `key: value` directives are skipped.
    pub fn parse(body: &str) -> Self {
        let mut groups = Vec::new();
        let mut current: Option<RuleGroup> = None;
        let mut in_agent_block = false;

        for line in body.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if !in_agent_block {
                        if let Some(group) = current.take() {
                            groups.push(group);
                        }
                        current = Some(RuleGroup::default());
                    }
                    if let Some(group) = current.as_mut() {
                        group.agents.push(value.to_ascii_lowercase());
                    }
                    in_agent_block = true;
                }
                "allow" | "disallow" => {
                    in_agent_block = false;
                    // Rules before the first User-agent line belong to nobody.
                    let Some(group) = current.as_mut() else {
                        continue;
                    };
                    if value.is_empty() {
                        continue;
                    }
                    group.rules.push(Rule {
                        allow: key == "allow",
                        pattern: value.to_string(),
                    });
                }
                "sitemap" => {}
                _ => in_agent_block = false,
            }
        }

        if let Some(group) = current {
            groups.push(group);
        }

        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|group| group.rules.is_empty())
    }

    /// Total `Allow`/`Disallow` rules across all groups.
    pub fn rule_count(&self) -> usize {
        self.groups.iter().map(|group| group.rules.len()).sum()
    }

    /// Answers whether `path` (path plus optional query) may be fetched by
    /// `user_agent`.
    ///
    /// Groups naming the agent's product token replace the `*` groups
    /// entirely. Among the applicable rules the longest matching pattern
    /// wins and an `Allow` wins a tie.
    pub fn is_allowed(&self, path: &str, user_agent: &str) -> bool {
        if self.is_empty() {
            return true;
        }
        let path = if path.is_empty() { "/" } else { path };
        let token = product_token(user_agent);

        let specific: Vec<&RuleGroup> = self.groups.iter().filter(|g| g.names(&token)).collect();
        let applicable = if specific.is_empty() {
            self.groups.iter().filter(|g| g.is_wildcard()).collect()
        } else {
            specific
        };

        let mut best: Option<&Rule> = None;
        for rule in applicable.iter().flat_map(|group| group.rules.iter()) {
            if !pattern_matches(&rule.pattern, path) {
                continue;
            }
            best = match best {
                Some(current)
                    if current.pattern.len() > rule.pattern.len()
                        || (current.pattern.len() == rule.pattern.len()
                            && (current.allow || !rule.allow)) =>
                {
                    Some(current)
                }
                _ => Some(rule),
            };
        }

        best.map_or(true, |rule| rule.allow)
    }
}

/// `Mozilla/5.0 (...)` -> `mozilla`.
fn product_token(user_agent: &str) -> String {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Prefix match with `*` wildcards and an optional trailing `$` anchor.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(stripped) => (stripped, true),
        None => (pattern, false),
    };

    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or("");
    if !path.starts_with(first) {
        return false;
    }
    let mut pos = first.len();
    let rest: Vec<&str> = parts.collect();

    if rest.is_empty() {
        return !anchored || pos == path.len();
    }

    for (i, part) in rest.iter().enumerate() {
        let remaining = &path[pos..];
        if anchored && i == rest.len() - 1 {
            return remaining.ends_with(part);
        }
        match remaining.find(part) {
            Some(idx) => pos += idx + part.len(),
            None => return false,
        }
    }
    true
}
