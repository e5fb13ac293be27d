//! Ready-made programs for trying the engine out.

/// A named example program with a few queries worth asking it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Short name used to load the sample
    pub name: &'static str,
    /// One-line summary
    pub description: &'static str,
    /// Program text
    pub source: &'static str,
    /// Example queries
    pub queries: &'static [&'static str],
}

const FAMILY: &str = "
% A small family tree.
parent(tom, bob).
parent(tom, liz).
parent(bob, ann).
parent(bob, pat).
parent(pat, jim).

grandparent(X, Z) :- parent(X, Y), parent(Y, Z).
sibling(X, Y) :- parent(P, X), parent(P, Y), X \\= Y.

ancestor(X, Y) :- parent(X, Y).
ancestor(X, Y) :- parent(X, Z), ancestor(Z, Y).
";

const PEANO: &str = "
% Natural numbers as z, s(z), s(s(z)), ...
nat(z).
nat(s(N)) :- nat(N).

plus(z, Y, Y).
plus(s(X), Y, s(Z)) :- plus(X, Y, Z).
";

const GRAPH: &str = "
% Reachability in a directed acyclic graph.
edge(a, b).
edge(a, c).
edge(b, d).
edge(c, d).
edge(d, e).

path(X, Y) :- edge(X, Y).
path(X, Y) :- edge(X, Z), path(Z, Y).
";

const COLORING: &str = "
% Color the mainland states of Australia so that neighbours differ.
color(red).
color(green).
color(blue).

coloring(WA, NT, SA, Q, NSW, V) :-
    color(WA), color(NT), color(SA), color(Q), color(NSW), color(V),
    WA \\= NT, WA \\= SA, NT \\= SA, NT \\= Q, SA \\= Q,
    SA \\= NSW, SA \\= V, Q \\= NSW, NSW \\= V.
";

const CATALOG: &[Sample] = &[
    Sample {
        name: "family",
        description: "parents, grandparents, siblings and ancestors",
        source: FAMILY,
        queries: &[
            "grandparent(tom, X).",
            "sibling(ann, S).",
            "ancestor(tom, D).",
        ],
    },
    Sample {
        name: "peano",
        description: "Peano naturals and addition run backwards",
        source: PEANO,
        queries: &["plus(s(z), s(z), N).", "plus(X, Y, s(s(z)))."],
    },
    Sample {
        name: "graph",
        description: "paths in a small directed graph",
        source: GRAPH,
        queries: &["path(a, X).", "path(X, e)."],
    },
    Sample {
        name: "coloring",
        description: "map coloring by generate and test with \\=",
        source: COLORING,
        queries: &["coloring(WA, NT, SA, Q, NSW, V)."],
    },
];

/// All samples
#[must_use]
pub fn catalog() -> &'static [Sample] {
    CATALOG
}

/// Look up a sample by name
#[must_use]
pub fn find(name: &str) -> Option<&'static Sample> {
    CATALOG.iter().find(|sample| sample.name == name)
}
