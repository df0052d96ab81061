use std::fmt;

use crate::graph::is_ground;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Resistor,
    Capacitor,
}

impl ComponentKind {
    /// Kind selected by the first character of a SPICE element name.
    pub fn from_designator(name: &str) -> Option<Self> {
        match name.chars().next()?.to_ascii_uppercase() {
            'R' => Some(Self::Resistor),
            'C' => Some(Self::Capacitor),
            _ => None,
        }
    }

    pub fn prefix(&self) -> char {
        match self {
            Self::Resistor => 'R',
            Self::Capacitor => 'C',
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resistor => write!(f, "resistor"),
            Self::Capacitor => write!(f, "capacitor"),
        }
    }
}

/// A single resistor or capacitor record.
///
/// `nodes` is `None` for components built from bare value arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: String,
    pub kind: ComponentKind,
    pub value: f64,
    pub nodes: Option<(String, String)>,
}

impl Component {
    pub fn resistor(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            kind: ComponentKind::Resistor,
            value,
            nodes: None,
        }
    }

    pub fn capacitor(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            kind: ComponentKind::Capacitor,
            value,
            nodes: None,
        }
    }

    pub fn between(mut self, node1: impl Into<String>, node2: impl Into<String>) -> Self {
        self.nodes = Some((node1.into(), node2.into()));
        self
    }

    pub fn is_resistor(&self) -> bool {
        self.kind == ComponentKind::Resistor
    }

    pub fn is_capacitor(&self) -> bool {
        self.kind == ComponentKind::Capacitor
    }
}

/// An RC ladder in driving-point-first order.
///
/// Component order is significant: the first component sits at the driving
/// point and each resistor moves one node further away from it. The ladder is
/// never reordered after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ladder {
    components: Vec<Component>,
}

impl Ladder {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    /// Build a ladder from bare value arrays.
    ///
    /// Node `i` carries `cs[i]` and `rs[i]` joins node `i` to node `i + 1`, so
    /// the sequence is `C0, R0, C1, R1, ...` with any surplus of either array
    /// continuing the chain.
    pub fn from_values(rs: &[f64], cs: &[f64]) -> Self {
        let mut components = Vec::with_capacity(rs.len() + cs.len());
        for i in 0..rs.len().max(cs.len()) {
            if let Some(&c) = cs.get(i) {
                components.push(Component::capacitor(format!("C{}", i + 1), c));
            }
            if let Some(&r) = rs.get(i) {
                components.push(Component::resistor(format!("R{}", i + 1), r));
            }
        }
        Self { components }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn resistances(&self) -> impl Iterator<Item = f64> + '_ {
        self.components
            .iter()
            .filter(|c| c.is_resistor())
            .map(|c| c.value)
    }

    pub fn capacitances(&self) -> impl Iterator<Item = f64> + '_ {
        self.components
            .iter()
            .filter(|c| c.is_capacitor())
            .map(|c| c.value)
    }

    pub fn total_resistance(&self) -> f64 {
        self.resistances().sum()
    }

    pub fn total_capacitance(&self) -> f64 {
        self.capacitances().sum()
    }

    /// True when every component carries two node names.
    pub fn has_nodes(&self) -> bool {
        !self.components.is_empty() && self.components.iter().all(|c| c.nodes.is_some())
    }

    /// Node names along the chain, driving point first.
    ///
    /// Starting at the entry node, every resistor steps to its opposite
    /// terminal. Components without node names get synthetic `n<i>` names
    /// following the array layout of [`Ladder::from_values`].
    pub fn node_path(&self) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = match self.entry_node() {
            Some(node) => node.to_string(),
            None => "n0".to_string(),
        };
        path.push(current.clone());

        for component in self.components.iter().filter(|c| c.is_resistor()) {
            current = match &component.nodes {
                Some((a, b)) if *a == current => b.clone(),
                Some((a, b)) if *b == current => a.clone(),
                Some((_, b)) => b.clone(),
                None => format!("n{}", path.len()),
            };
            path.push(current.clone());
        }
        path
    }

    /// The non-ground node of the first component, if node names are known.
    pub fn entry_node(&self) -> Option<&str> {
        let (a, b) = self.components.first()?.nodes.as_ref()?;
        if is_ground(a) {
            Some(b.as_str())
        } else {
            Some(a.as_str())
        }
    }
}

impl FromIterator<Component> for Ladder {
    fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
