use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use crate::{
    builder::{self, BuildOptions, IndexOrigin},
    error::{Error, Result},
    handle::IndexHandle,
    query::QueryParser,
    search,
};

/// Everything the interactive loop needs besides its input and output.
pub struct Session {
    pub handle: IndexHandle,
    pub parser: QueryParser,
    pub corpus_dir: PathBuf,
    pub cache_path: PathBuf,
    pub build_options: BuildOptions,
    pub show_urls: bool,
}

impl Session {
    fn prompt(&self) -> String {
        let syntax = self.parser.syntax();
        format!(
            "Enter a boolean query (e.g. word1 {} word2 {} {}word3):",
            syntax.and, syntax.or, syntax.not
        )
    }

    fn help(&self) -> String {
        let syntax = self.parser.syntax();
        format!(
            "{and} binds tighter than {or}; {not} negates the word it is \
             attached to.\n\
             Commands: :stats, :rebuild, :help",
            and = syntax.and,
            or = syntax.or,
            not = syntax.not,
        )
    }
}

/// Read queries from `input` until it is exhausted, writing one answer per
/// query to `output`.
///
/// A malformed query is reported and the loop moves on to the next line.
/// Lines starting with `:` are commands rather than queries.
pub fn run(
    session: &Session,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<()> {
    writeln!(output, "{}", session.prompt())?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();

        if let Some(command) = line.strip_prefix(':') {
            run_command(session, command.trim(), &mut output)?;
        } else {
            let index = session.handle.snapshot();
            match search::execute_search(&session.parser, &index, line) {
                Ok(ids) if session.show_urls => {
                    search::write_with_sources(&mut output, &ids, &index)?;
                }
                Ok(ids) => writeln!(output, "{}", search::format_ids(&ids))?,
                Err(Error::MalformedQuery(e)) => {
                    tracing::debug!(query = line, "rejected query: {e}");
                    writeln!(output, "error: malformed query: {e}")?;
                }
                Err(e) => return Err(e),
            }
        }

        writeln!(output, "{}", session.prompt())?;
        output.flush()?;
    }

    Ok(())
}

fn run_command(
    session: &Session,
    command: &str,
    output: &mut impl Write,
) -> Result<()> {
    match command {
        "stats" => {
            let index = session.handle.snapshot();
            writeln!(
                output,
                "documents: {}, terms: {}",
                index.document_count(),
                index.term_count()
            )?;
        }
        "rebuild" => {
            let loaded = builder::rebuild(
                &session.corpus_dir,
                &session.cache_path,
                &session.build_options,
            );
            match &loaded.origin {
                IndexOrigin::Built(report) if !report.is_complete() => {
                    writeln!(output, "rebuild interrupted, keeping old index")?;
                    return Ok(());
                }
                IndexOrigin::Unavailable => {
                    writeln!(output, "no corpus available, keeping old index")?;
                    return Ok(());
                }
                _ => {}
            }
            let documents = loaded.index.document_count();
            session.handle.publish(loaded.index);
            writeln!(output, "rebuilt index with {documents} documents")?;
        }
        "help" => writeln!(output, "{}", session.help())?,
        other => writeln!(output, "error: unknown command :{other}")?,
    }
    Ok(())
}
