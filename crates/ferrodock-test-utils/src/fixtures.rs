//! Structure and report text used across test suites.

/// Trimmed 1stp-like entry: chain A protein, a chain B atom, one water and
/// the biotin (BTN) ligand in chain A.
pub const STREPTAVIDIN_PDB: &str = "\
HEADER    BIOTIN-BINDING PROTEIN                  20-JUN-92   1STP
ATOM      1  N   ALA A  16       3.512  21.001  29.340  1.00 20.00           N
ATOM      2  CA  ALA A  16       4.205  22.110  28.702  1.00 20.00           C
ATOM      3  C   ALA A  16       5.700  21.870  28.610  1.00 20.00           C
ATOM      4  O   ALA A  16       6.210  20.760  28.850  1.00 20.00           O
ATOM      5  N   GLY A  17       6.420  22.930  28.250  1.00 20.00           N
ATOM      6  CA  GLY A  17       7.870  22.870  28.120  1.00 20.00           C
TER       7      GLY A  17
ATOM      8  N   SER B  20      30.100   5.200  11.000  1.00 20.00           N
HETATM    9  O   HOH A 301       9.500  19.000  31.000  1.00 20.00           O
HETATM   10  C11 BTN A 200      10.000  20.000  30.000  1.00 20.00           C
HETATM   11  O11 BTN A 200      12.000  22.000  31.000  1.00 20.00           O
HETATM   12  S1  BTN A 200      11.000  17.000  35.000  1.00 20.00           S
HETATM   13  N1  BTN A 200      14.000  18.500  33.000  1.00 20.00           N
END
";

/// Number of BTN atoms in [`STREPTAVIDIN_PDB`].
pub const BTN_CHAIN_A_ATOMS: usize = 4;

/// Box around the BTN atoms of [`STREPTAVIDIN_PDB`].
pub const BTN_CHAIN_A_CENTER: [f64; 3] = [12.0, 19.5, 32.5];
/// Unpadded extent of the BTN atoms; add `2 * padding` per axis.
pub const BTN_CHAIN_A_EXTENT: [f64; 3] = [4.0, 5.0, 5.0];

/// Only the ligand records of [`STREPTAVIDIN_PDB`], as a selection tool would save them.
pub const BTN_REFERENCE_PDB: &str = "\
HETATM   10  C11 BTN A 200      10.000  20.000  30.000  1.00 20.00           C
HETATM   11  O11 BTN A 200      12.000  22.000  31.000  1.00 20.00           O
HETATM   12  S1  BTN A 200      11.000  17.000  35.000  1.00 20.00           S
HETATM   13  N1  BTN A 200      14.000  18.500  33.000  1.00 20.00           N
END
";

/// The same residue name bound in two chains.
pub const TWO_CHAIN_LIGAND_PDB: &str = "\
HETATM    1  C1  BTN A 200       5.000   5.000   5.000  1.00 20.00           C
HETATM    2  C2  BTN A 200       6.000   5.500   5.000  1.00 20.00           C
HETATM    3  C1  BTN B 200      -1.500   2.000   0.250  1.00 20.00           C
HETATM    4  C2  BTN B 200      -2.500   3.000   1.250  1.00 20.00           C
END
";

/// Console output of a nine-mode Vina 1.2 run.
pub const VINA_LOG: &str = "\
AutoDock Vina v1.2.5
#################################################################
# If you used AutoDock Vina in your work, please cite:          #
#                                                               #
# J. Eberhardt, D. Santos-Martins, A. F. Tillack, and S. Forli  #
# AutoDock Vina 1.2.0: New Docking Methods, Expanded Force      #
# Field, and Python Bindings, J. Chem. Inf. Model. (2021)       #
#################################################################

Scoring function : vina
Rigid receptor: receptor.pdbqt
Ligand: ligand.pdbqt
Grid center: X 12 Y 19.5 Z 32.5
Grid size  : X 24 Y 25 Z 25
Grid space : 0.375
Exhaustiveness: 8
CPU: 0
Verbosity: 1

Computing Vina grid ... done.
Performing docking (random seed: -1911198398) ...
0%   10   20   30   40   50   60   70   80   90   100%
|----|----|----|----|----|----|----|----|----|----|
***************************************************

mode |   affinity | dist from best mode
     | (kcal/mol) | rmsd l.b.| rmsd u.b.
-----+------------+----------+----------
   1       -7.109          0          0
   2       -6.153      1.927      2.876
   3       -6.007      2.164      3.427
   4       -5.874      1.788      2.391
   5       -5.723      2.642      4.981
   6       -5.601      3.017      5.226
   7       -5.512      1.409      2.037
   8       -5.389      2.872      6.123
   9       -5.205      3.311      5.874
";

/// A Vina run that found only three distinct poses.
pub const SHORT_VINA_LOG: &str = "\
Computing Vina grid ... done.
Performing docking (random seed: 42) ...

mode |   affinity | dist from best mode
     | (kcal/mol) | rmsd l.b.| rmsd u.b.
-----+------------+----------+----------
   1       -7.109          0          0
   2       -6.153      1.927      2.876
   3       -6.007      2.164      3.427
";

/// Minimal pose file content.
pub const POSES_PDBQT: &str = "\
MODEL 1
REMARK VINA RESULT:    -7.109      0.000      0.000
ENDMDL
";
