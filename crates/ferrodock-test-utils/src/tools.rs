//! Stand-in executables for the external preparation and docking tools.
//!
//! The scripts honour the same command-line contract as the real programs
//! but only copy files around, so pipeline tests run without PyMOL, Open
//! Babel or Vina installed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::fixtures;

/// Paths of installed stub tools.
#[derive(Debug, Clone)]
pub struct FakeTools {
    pub pymol: PathBuf,
    pub obabel: PathBuf,
    pub vina: PathBuf,
}

/// `pymol -c -q script.pml`: copies the loaded structure to the save target.
const FAKE_PYMOL: &str = r#"#!/bin/sh
script="$3"
src=$(sed -n 's/^load \(.*\), structure$/\1/p' "$script")
dst=$(sed -n 's/^save \(.*\), structure and .*$/\1/p' "$script")
cp "$src" "$dst"
"#;

/// `obabel in -O out ...`: copies `in` to `out`.
const FAKE_OBABEL: &str = r#"#!/bin/sh
cp "$1" "$3"
"#;

/// Write an executable shell script to `dir/name`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, body)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }
    Ok(path)
}

/// Vina stand-in that prints `report` and writes a one-model pose file to `--out`.
pub fn fake_vina_script(report: &str) -> String {
    format!(
        "#!/bin/sh\n\
         out=''\n\
         while [ $# -gt 0 ]; do\n\
         \x20 case \"$1\" in\n\
         \x20   --out) out=\"$2\"; shift ;;\n\
         \x20 esac\n\
         \x20 shift\n\
         done\n\
         cat > \"$out\" <<'POSES'\n{poses}POSES\n\
         cat <<'REPORT'\n{report}REPORT\n",
        poses = fixtures::POSES_PDBQT,
        report = report,
    )
}

/// Install pymol, obabel and vina stand-ins in `dir`; vina prints [`fixtures::VINA_LOG`].
pub fn install_fake_tools(dir: &Path) -> io::Result<FakeTools> {
    install_fake_tools_with_report(dir, fixtures::VINA_LOG)
}

pub fn install_fake_tools_with_report(dir: &Path, report: &str) -> io::Result<FakeTools> {
    fs::create_dir_all(dir)?;
    Ok(FakeTools {
        pymol: write_script(dir, "pymol", FAKE_PYMOL)?,
        obabel: write_script(dir, "obabel", FAKE_OBABEL)?,
        vina: write_script(dir, "vina", &fake_vina_script(report))?,
    })
}
