//! Move-record tree: the mainline plus every variation created by taking moves back and
//! playing something else.

use shakmaty::san::SanPlus;
use shakmaty::{Chess, Move, Position};

use crate::pgn;
use crate::rules::{self, STANDARD_FEN};

pub type NodeId = usize;

pub const ROOT: NodeId = 0;

/// Tag names that always lead an exported header, in export order.
pub const SEVEN_TAG_ROSTER: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMove {
    pub san: String,
    pub uci: String,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    played: Option<RecordedMove>,
    position: Chess,
    children: Vec<NodeId>,
    /// Child `forward` follows; the last one visited, else the first.
    preferred: Option<NodeId>,
    comment: Option<String>,
}

impl Node {
    fn new(parent: Option<NodeId>, played: Option<RecordedMove>, position: Chess) -> Self {
        Self {
            parent,
            played,
            position,
            children: Vec::new(),
            preferred: None,
            comment: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameRecord {
    tags: Vec<(String, String)>,
    nodes: Vec<Node>,
    cursor: NodeId,
    result: Option<String>,
}

impl GameRecord {
    pub fn new(start: Chess) -> Self {
        let tags = vec![
            ("Event".to_string(), "Casual game".to_string()),
            ("Site".to_string(), "?".to_string()),
            ("Date".to_string(), "????.??.??".to_string()),
            ("Round".to_string(), "-".to_string()),
            ("White".to_string(), "?".to_string()),
            ("Black".to_string(), "?".to_string()),
        ];
        Self::with_tags(start, tags)
    }

    pub fn with_tags(start: Chess, tags: Vec<(String, String)>) -> Self {
        let mut record = Self {
            tags: Vec::new(),
            nodes: vec![Node::new(None, None, start)],
            cursor: ROOT,
            result: None,
        };
        for (name, value) in tags {
            record.set_tag(&name, value);
        }
        record
    }

    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(tag, _)| tag == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets a header tag. `Result` is tracked separately so it can follow the game.
    pub fn set_tag(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if name == "Result" {
            self.result = (value != "*").then_some(value);
            return;
        }
        match self.tags.iter_mut().find(|(tag, _)| tag == name) {
            Some((_, existing)) => *existing = value,
            None => self.tags.push((name.to_string(), value)),
        }
    }

    /// Tags in export order: the seven-tag roster, `SetUp`/`FEN` for a non-standard start, then
    /// everything else as imported.
    pub fn export_tags(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(self.tags.len() + 3);
        for name in SEVEN_TAG_ROSTER {
            let value = match name {
                "Result" => self.result(),
                "Date" => self.tag(name).unwrap_or("????.??.??").to_string(),
                _ => self.tag(name).unwrap_or("?").to_string(),
            };
            out.push((name.to_string(), value));
        }
        let start_fen = rules::to_fen(self.root_position());
        if start_fen != STANDARD_FEN {
            out.push(("SetUp".to_string(), "1".to_string()));
            out.push(("FEN".to_string(), start_fen));
        }
        for (name, value) in &self.tags {
            if SEVEN_TAG_ROSTER.contains(&name.as_str()) || name == "SetUp" || name == "FEN" {
                continue;
            }
            out.push((name.clone(), value.clone()));
        }
        out
    }

    /// Outcome of the mainline's final position, else the imported result, else `*`.
    pub fn result(&self) -> String {
        let end = &self.nodes[self.mainline_end()].position;
        match end.outcome() {
            Some(outcome) => outcome.to_string(),
            None => self.result.clone().unwrap_or_else(|| "*".to_string()),
        }
    }

    /// Number of recorded moves across all lines.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    pub fn root_position(&self) -> &Chess {
        &self.nodes[ROOT].position
    }

    pub fn current_position(&self) -> &Chess {
        &self.nodes[self.cursor].position
    }

    pub fn position(&self, id: NodeId) -> Option<&Chess> {
        self.nodes.get(id).map(|node| &node.position)
    }

    pub fn recorded(&self, id: NodeId) -> Option<&RecordedMove> {
        self.nodes.get(id).and_then(|node| node.played.as_ref())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Children of `id`; the first is the main continuation.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn comment(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).and_then(|node| node.comment.as_deref())
    }

    pub fn append_comment(&mut self, id: NodeId, text: &str) {
        let text = text.trim();
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if text.is_empty() {
            return;
        }
        match &mut node.comment {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(text);
            }
            None => node.comment = Some(text.to_string()),
        }
    }

    /// Plays `m` from the cursor and moves the cursor onto the resulting node.
    ///
    /// An existing child with the same move is reused; otherwise a new child is appended, which
    /// becomes a variation when the cursor already had a continuation. Returns `None` when `m`
    /// is not legal at the cursor.
    pub fn add_variation(&mut self, m: &Move) -> Option<NodeId> {
        let parent = self.cursor;
        let mut position = self.nodes[parent].position.clone();
        if !position.is_legal(m) {
            return None;
        }
        let uci = rules::uci(m);

        let existing = self.nodes[parent]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child].played.as_ref().is_some_and(|p| p.uci == uci));
        if let Some(child) = existing {
            self.select(child);
            return Some(child);
        }

        let extends_mainline = parent == self.mainline_end();
        let san = SanPlus::from_move_and_play_unchecked(&mut position, m).to_string();
        let id = self.nodes.len();
        self.nodes
            .push(Node::new(Some(parent), Some(RecordedMove { san, uci }), position));
        self.nodes[parent].children.push(id);
        if extends_mainline {
            self.result = None;
        }
        self.select(id);
        Some(id)
    }

    /// Moves the cursor to `id`, marking each node on the way as its parent's preferred child.
    pub fn select(&mut self, id: NodeId) -> Option<&Chess> {
        if id >= self.nodes.len() {
            return None;
        }
        let mut child = id;
        while let Some(parent) = self.nodes[child].parent {
            self.nodes[parent].preferred = Some(child);
            child = parent;
        }
        self.cursor = id;
        Some(&self.nodes[id].position)
    }

    /// Steps the cursor to its parent.
    pub fn back(&mut self) -> Option<&Chess> {
        let parent = self.nodes[self.cursor].parent?;
        self.nodes[parent].preferred = Some(self.cursor);
        self.cursor = parent;
        Some(&self.nodes[parent].position)
    }

    /// Steps the cursor to the last-visited child (the main continuation if none was visited).
    pub fn forward(&mut self) -> Option<&Chess> {
        let node = &self.nodes[self.cursor];
        let next = node.preferred.or_else(|| node.children.first().copied())?;
        self.cursor = next;
        Some(&self.nodes[next].position)
    }

    pub fn mainline_end(&self) -> NodeId {
        let mut id = ROOT;
        while let Some(&next) = self.nodes[id].children.first() {
            id = next;
        }
        id
    }

    pub fn mainline(&self) -> Vec<&RecordedMove> {
        self.line_to(self.mainline_end())
    }

    pub fn to_pgn(&self) -> String {
        pgn::write_game(self)
    }

    /// Moves from the start position to `id`, in play order.
    pub fn line_to(&self, id: NodeId) -> Vec<&RecordedMove> {
        let mut line = Vec::new();
        let mut current = Some(id).filter(|&id| id < self.nodes.len());
        while let Some(node_id) = current {
            let node = &self.nodes[node_id];
            if let Some(played) = &node.played {
                line.push(played);
            }
            current = node.parent;
        }
        line.reverse();
        line
    }
}

impl Default for GameRecord {
    fn default() -> Self {
        Self::new(Chess::default())
    }
}
