// Delimited-text sink for the spike raster and the mean-potential trace.
//
// Records end with a trailing "; " separator and neuron ids are written
// 1-based; the engine itself is 0-based throughout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use izhnet_core::{SimulationOutput, SpikeLog, TraceLog};

pub const SPIKE_FILE: &str = "rastr.csv";
pub const TRACE_FILE: &str = "oscill.csv";

pub fn write_spikes<W: Write>(w: &mut W, spikes: &SpikeLog) -> io::Result<()> {
    for ev in spikes.iter() {
        writeln!(w, "{}; {}; ", ev.time, ev.neuron_id as u64 + 1)?;
    }
    Ok(())
}

pub fn write_trace<W: Write>(w: &mut W, trace: &TraceLog) -> io::Result<()> {
    for s in trace.iter() {
        writeln!(w, "{}; {}; ", s.time, s.mean_potential)?;
    }
    Ok(())
}

fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);
    body(&mut w).with_context(|| format!("writing {}", path.display()))?;
    w.flush().with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

/// Writes both streams into `dir`; returns (spike path, trace path).
pub fn persist(dir: &Path, out: &SimulationOutput) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let spike_path = dir.join(SPIKE_FILE);
    let trace_path = dir.join(TRACE_FILE);
    write_file(&spike_path, |w| write_spikes(w, &out.spikes))?;
    write_file(&trace_path, |w| write_trace(w, &out.trace))?;
    Ok((spike_path, trace_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use izhnet_core::SpikeEvent;

    #[test]
    fn spike_records_are_one_based_with_trailing_separator() {
        let mut spikes = SpikeLog::new();
        spikes.push(SpikeEvent { neuron_id: 0, time: 0.5 });
        spikes.push(SpikeEvent { neuron_id: 124, time: 12.0 });
        let mut buf = Vec::new();
        write_spikes(&mut buf, &spikes).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "0.5; 1; \n12; 125; \n");
    }

    #[test]
    fn trace_records_one_per_step() {
        let mut trace = TraceLog::new();
        trace.push_mean(0.0, &[-60.0, -60.0]);
        trace.push_mean(0.5, &[-59.5, -60.5]);
        trace.push_mean(1.0, &[-59.25]);
        let mut buf = Vec::new();
        write_trace(&mut buf, &trace).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "0; -60; \n0.5; -60; \n1; -59.25; \n"
        );
    }

    #[test]
    fn empty_streams_write_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let (spikes, trace) = persist(dir.path(), &SimulationOutput::default()).unwrap();
        assert_eq!(std::fs::read_to_string(spikes).unwrap(), "");
        assert_eq!(std::fs::read_to_string(trace).unwrap(), "");
    }
}
