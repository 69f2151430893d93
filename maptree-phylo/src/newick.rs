//! Read and write [Newick](https://en.wikipedia.org/wiki/Newick_format) strings.

use crate::{FromNewick, Phylogeny};
use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use num_traits::AsPrimitive;
use petgraph::graph::NodeIndex;
use std::fmt::{Debug, Display};

/// Characters that end an unquoted Newick label.
const DELIMITERS: [char; 4] = ['(', ')', ',', ';'];

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Open,
    Close,
    Comma,
    End,
    /// Node label and branch attributes (ex. `A:0.1`), quotes preserved.
    Text(String),
}

/// Split Newick node text into its label and branch attributes.
///
/// Quoted labels keep any delimiters they contain, and `''` inside a quoted label
/// is an escaped single quote.
///
/// ## Examples
///
/// ```rust
/// use maptree_phylo::newick::split_label;
/// assert_eq!(split_label("A:0.1:90;"), ("A".to_string(), ":0.1:90".to_string()));
/// assert_eq!(split_label("'O''Brien strain':2"), ("O'Brien strain".to_string(), ":2".to_string()));
/// assert_eq!(split_label(":2"), ("".to_string(), ":2".to_string()));
/// ```
pub fn split_label(newick: &str) -> (String, String) {
    let newick = newick.trim().trim_end_matches(';');

    if let Some(quoted) = newick.strip_prefix('\'') {
        let mut label = String::new();
        let mut chars = quoted.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c == '\'' {
                // doubled quote is an escaped quote
                if let Some((_, '\'')) = chars.peek() {
                    label.push('\'');
                    chars.next();
                    continue;
                }
                let attributes = quoted[i + 1..].to_string();
                return (label, attributes);
            }
            label.push(c);
        }
        // unterminated quote, keep everything as label
        return (label, String::new());
    }

    match newick.find(':') {
        Some(i) => (newick[..i].to_string(), newick[i..].to_string()),
        None => (newick.to_string(), String::new()),
    }
}

/// Returns a label quoted for Newick output if it contains reserved characters.
///
/// ```rust
/// use maptree_phylo::newick::quote_label;
/// assert_eq!(quote_label("Org_A"), "Org_A");
/// assert_eq!(quote_label("Org A"), "'Org A'");
/// assert_eq!(quote_label("O'Brien"), "'O''Brien'");
/// ```
pub fn quote_label(label: &str) -> String {
    let reserved = |c: char| DELIMITERS.contains(&c) || c == ':' || c == '\'' || c.is_whitespace();
    match label.chars().any(reserved) {
        true => format!("'{}'", label.replace('\'', "''")),
        false => label.to_string(),
    }
}

/// Break a Newick string into structural tokens, dropping whitespace and `[comments]`.
fn tokenize(newick: &str) -> Result<Vec<Token>, Report> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut in_quote = false;
    let mut in_comment = false;

    let flush = |text: &mut String, tokens: &mut Vec<Token>| {
        if !text.is_empty() {
            tokens.push(Token::Text(std::mem::take(text)));
        }
    };

    let mut chars = newick.chars().peekable();
    while let Some(c) = chars.next() {
        if in_comment {
            in_comment = c != ']';
            continue;
        }
        if in_quote {
            text.push(c);
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    text.push('\'');
                    chars.next();
                } else {
                    in_quote = false;
                }
            }
            continue;
        }
        match c {
            '\'' => {
                in_quote = true;
                text.push(c);
            }
            '[' => in_comment = true,
            '(' => {
                flush(&mut text, &mut tokens);
                tokens.push(Token::Open);
            }
            ')' => {
                flush(&mut text, &mut tokens);
                tokens.push(Token::Close);
            }
            ',' => {
                flush(&mut text, &mut tokens);
                tokens.push(Token::Comma);
            }
            ';' => {
                flush(&mut text, &mut tokens);
                tokens.push(Token::End);
            }
            c if c.is_whitespace() => (),
            c => text.push(c),
        }
    }

    if in_quote {
        return Err(eyre!("Unterminated quoted label in newick: {newick}"));
    }
    flush(&mut text, &mut tokens);

    Ok(tokens)
}

/// Returns a [`Phylogeny`] of nodes (`N`) and branches (`B`) parsed from a Newick string.
///
/// # Arguments
///
/// - `newick` - A Newick [`str`] (ex. `"(A,B);"`)
///
/// # Examples
///
/// From a Newick string with only tip names.
///
/// ```rust
/// use maptree_phylo::{newick, Branch, Node, Phylogeny};
/// let phylo: Phylogeny<Node<String>, Branch> = newick::str_to_phylogeny("(A,B);")?;
/// let leaves: Vec<_> = phylo.get_leaves()?.into_iter().map(|i| phylo.get_node(&i).unwrap().to_string()).collect();
/// assert_eq!(leaves, ["A", "B"]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
///
/// From a Newick string with tip names, support values, branch lengths, and comments.
///
/// ```rust
/// use maptree_phylo::{newick, Branch, Node, Phylogeny};
/// let nwk = "(A:0.5,B:0.25,(C:0.25,D:0.5)100:0.25[&&NHX:S=x]);";
/// let phylo: Phylogeny<Node<String>, Branch> = newick::str_to_phylogeny(nwk)?;
/// assert_eq!(phylo.get_leaves()?.len(), 4);
/// let d = phylo.get_leaf_index(&Node::from("D"))?;
/// assert_eq!(phylo.get_distance_to_root(&d)?, 0.75);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
///
/// Unbalanced parentheses return an error.
///
/// ```rust
/// use maptree_phylo::{newick, Branch, Node, Phylogeny};
/// let result: Result<Phylogeny<Node<String>, Branch>, _> = newick::str_to_phylogeny("((A,B);");
/// assert!(result.is_err());
/// ```
pub fn str_to_phylogeny<N, B>(newick: &str) -> Result<Phylogeny<N, B>, Report>
where
    N: Clone + Debug + Default + Display + FromNewick,
    B: AsPrimitive<f32> + Debug + Display + From<f32> + FromNewick,
{
    let tokens = tokenize(newick)?;
    if tokens.is_empty() {
        return Err(eyre!("Newick string is empty.")).suggestion("Is the tree file empty?");
    }

    let mut phylogeny = Phylogeny::new();
    let mut pos = 0;
    let (_root, _branch) = parse_clade(&tokens, &mut pos, &mut phylogeny)?;

    // only a terminating ';' may follow the root clade
    match tokens.get(pos) {
        None | Some(Token::End) => (),
        Some(token) => Err(eyre!("Unexpected {token:?} after the end of newick tree."))
            .suggestion("Check that the parentheses in the tree are balanced.")?,
    }

    Ok(phylogeny)
}

/// Recursively parse one clade starting at `pos`, returns the clade's node and the branch above it.
fn parse_clade<N, B>(
    tokens: &[Token],
    pos: &mut usize,
    phylogeny: &mut Phylogeny<N, B>,
) -> Result<(NodeIndex, B), Report>
where
    N: Clone + Debug + Default + Display + FromNewick,
    B: AsPrimitive<f32> + Debug + Display + From<f32> + FromNewick,
{
    let mut children = Vec::new();

    if tokens.get(*pos) == Some(&Token::Open) {
        *pos += 1;
        loop {
            children.push(parse_clade(tokens, pos, phylogeny)?);
            match tokens.get(*pos) {
                Some(Token::Comma) => *pos += 1,
                Some(Token::Close) => {
                    *pos += 1;
                    break;
                }
                Some(token) => Err(eyre!("Unexpected {token:?} inside newick clade."))?,
                None => Err(eyre!("Newick tree ended before a clade was closed."))
                    .suggestion("Check that the parentheses in the tree are balanced.")?,
            }
        }
    }

    // the label and branch attributes follow the children (if any)
    let text = match tokens.get(*pos) {
        Some(Token::Text(text)) => {
            *pos += 1;
            text.as_str()
        }
        _ => "",
    };

    let node = phylogeny.add_node(N::from_newick(text)?);
    let branch = B::from_newick(text)?;

    for (child, child_branch) in children {
        phylogeny.add_branch(node, child, child_branch)?;
    }

    Ok((node, branch))
}
