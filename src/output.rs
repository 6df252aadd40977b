use csv::WriterBuilder;
use ndarray::Array2;
use ndarray_csv::Array2Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::eos::Polytrope;
use crate::error::TovError;
use crate::sweep::MassRadiusCurve;
use crate::tov::SolutionCurve;

pub const MASS_RADIUS_HEADER: [&str; 3] = ["central_pressure", "mass", "radius"];
pub const PROFILE_HEADER: [&str; 4] = ["r", "m", "pressure", "energy_density"];

/// Write `array` as CSV with an optional header row.
pub fn write_array2<W: Write>(
    array: &Array2<f64>,
    header: Option<&[&str]>,
    sink: W,
) -> Result<(), TovError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(sink);
    if let Some(header) = header {
        writer.write_record(header)?;
    }
    writer.serialize_array2(array)?;
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_array2_file(
    array: &Array2<f64>,
    header: Option<&[&str]>,
    filename: &Path,
) -> Result<(), TovError> {
    let file = File::create(filename).map_err(|e| TovError::Io(filename.to_owned(), e))?;
    write_array2(array, header, file)
}

pub fn write_mass_radius(curve: &MassRadiusCurve, filename: &Path) -> Result<(), TovError> {
    write_array2_file(&curve.to_array2(), Some(&MASS_RADIUS_HEADER[..]), filename)
}

pub fn write_profile(
    profile: &SolutionCurve,
    eos: &Polytrope,
    filename: &Path,
) -> Result<(), TovError> {
    write_array2_file(&profile.to_array2(eos), Some(&PROFILE_HEADER[..]), filename)
}
