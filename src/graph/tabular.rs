//! Flat two-column table I/O for the graph (`id,name` and `source,target`).

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{CoactorError, Result};
use crate::graph::{Edge, Graph, Node, DELIMITER};

const NODES_HEADER: &str = "id,name";
const EDGES_HEADER: &str = "source,target";

impl Graph {
    /// Load a graph from a nodes table and an edges table.
    ///
    /// The first line of each table is a header and is skipped. Rows are
    /// taken as-is in file order (no deduplication). A missing file or a
    /// row with fewer than two columns fails the whole load.
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(nodes_path: P, edges_path: Q) -> Result<Self> {
        let nodes = read_rows(nodes_path.as_ref())?
            .into_iter()
            .map(|(id, name)| Node { id, name })
            .collect::<Vec<_>>();
        let edges = read_rows(edges_path.as_ref())?
            .into_iter()
            .map(|(source, target)| Edge { source, target })
            .collect::<Vec<_>>();

        log::debug!("Loaded {} nodes and {} edges", nodes.len(), edges.len());
        Ok(Self::from_parts(nodes, edges))
    }

    /// Write all nodes as `id,name` rows, replacing any existing file.
    pub fn write_nodes<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        write_rows(
            path,
            NODES_HEADER,
            self.nodes().iter().map(|n| (n.id.as_str(), n.name.as_str())),
        )?;
        log::info!("Wrote {} nodes to {}", self.total_nodes(), path.display());
        Ok(())
    }

    /// Write all edges as `source,target` rows, replacing any existing file.
    pub fn write_edges<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        write_rows(
            path,
            EDGES_HEADER,
            self.edges().iter().map(|e| (e.source.as_str(), e.target.as_str())),
        )?;
        log::info!("Wrote {} edges to {}", self.total_edges(), path.display());
        Ok(())
    }
}

fn read_rows(path: &Path) -> Result<Vec<(String, String)>> {
    let file = File::open(path)?;
    let mut rows = Vec::new();

    // Line 1 is the header
    for (idx, line) in BufReader::new(file).lines().enumerate().skip(1) {
        let line = line?;
        let mut fields = line.split(DELIMITER);
        match (fields.next(), fields.next()) {
            (Some(first), Some(second)) => rows.push((first.to_string(), second.to_string())),
            _ => {
                return Err(CoactorError::MalformedRow {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: "expected 2 columns".to_string(),
                })
            }
        }
    }

    Ok(rows)
}

fn write_rows<'a>(
    path: &Path,
    header: &str,
    rows: impl Iterator<Item = (&'a str, &'a str)>,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", header)?;
    for (first, second) in rows {
        writeln!(writer, "{}{}{}", first, DELIMITER, second)?;
    }
    writer.flush()?;
    Ok(())
}
