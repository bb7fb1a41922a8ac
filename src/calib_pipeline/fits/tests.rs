#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::path::{Path, PathBuf};

    use ndarray::{Array2, array};
    use tempfile::TempDir;

    use crate::calib_pipeline::common::error::CalibError;
    use crate::calib_pipeline::fits::{
        FitsHeader, FitsReader, FitsWriter, FitsioReader, FitsioWriter, Hdu, HduName, ImageData,
    };

    const BLOCK_LEN: usize = 2880;

    fn write(dir: &TempDir, name: &str, hdus: &[Hdu]) -> PathBuf {
        let path = dir.path().join(name);
        FitsioWriter.write_hdus(hdus, &path).unwrap();
        path
    }

    fn read(path: &Path, name: HduName<'_>, keys: &[&str]) -> Option<Hdu> {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        FitsioReader.read_hdu(path, name, &keys).unwrap()
    }

    /// Writes a raw FITS file from header cards and big-endian data bytes.
    fn write_raw(dir: &TempDir, name: &str, cards: &[&str], data: &[u8]) -> PathBuf {
        let mut bytes = Vec::new();
        for card in cards.iter().chain(&["END"]) {
            bytes.extend_from_slice(format!("{card:<80}").as_bytes());
        }
        bytes.resize(bytes.len().div_ceil(BLOCK_LEN) * BLOCK_LEN, b' ');
        bytes.extend_from_slice(data);
        bytes.resize(bytes.len().div_ceil(BLOCK_LEN) * BLOCK_LEN, 0);

        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn preproc_hdus() -> (Vec<Hdu>, Array2<f32>, Array2<f64>) {
        let mut header = FitsHeader::new();
        header.set("CCDSECA", "[1:2,1:2]");
        header.set("EXPTIME", 300.0);
        header.set("NIGHT", 20201015i64);
        let image = array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let ivar = array![[0.5f64, 0.0, 1.0], [2.0, 3.0, 4.0]];
        let hdus = vec![
            Hdu::named("IMAGE", header, ImageData::F32(image.clone())),
            Hdu::named("IVAR", FitsHeader::new(), ImageData::F64(ivar.clone())),
        ];
        (hdus, image, ivar)
    }

    #[test]
    fn test_multi_hdu_round_trip() {
        let dir = TempDir::new().unwrap();
        let (hdus, image, ivar) = preproc_hdus();
        let path = write(&dir, "preproc.fits", &hdus);

        let primary = read(&path, HduName::Extension("IMAGE"), &["CCDSECA", "EXPTIME", "NIGHT"])
            .unwrap();
        assert_eq!(primary.extname(), Some("IMAGE"));
        assert_eq!(primary.data, ImageData::F32(image));
        assert_eq!(primary.header.get_str("CCDSECA"), Some("[1:2,1:2]"));
        assert_eq!(primary.header.get_float("EXPTIME"), Some(300.0));
        assert_eq!(primary.header.get_int("NIGHT"), Some(20201015));

        let ivar_hdu = read(&path, HduName::Extension("IVAR"), &[]).unwrap();
        assert_eq!(ivar_hdu.data, ImageData::F64(ivar));
    }

    #[test]
    fn test_missing_extension_and_key() {
        let dir = TempDir::new().unwrap();
        let (hdus, _, _) = preproc_hdus();
        let path = write(&dir, "preproc.fits", &hdus);

        assert!(read(&path, HduName::Extension("MASK"), &[]).is_none());
        let hdu = read(&path, HduName::Primary, &["CCDSECB"]).unwrap();
        assert_eq!(hdu.header.get("CCDSECB"), None);
    }

    #[test]
    fn test_u16_uses_bzero_offset() {
        let dir = TempDir::new().unwrap();
        let mask = array![[0u16, 4], [65535, 1]];
        let hdu = Hdu::named("MASK", FitsHeader::new(), ImageData::U16(mask.clone()));
        let path = write(&dir, "mask.fits", &[hdu]);

        let hdu = read(&path, HduName::Extension("MASK"), &["BZERO", "BITPIX"]).unwrap();
        assert_eq!(hdu.header.get_int("BZERO"), Some(32768));
        assert_eq!(hdu.header.get_int("BITPIX"), Some(16));
        assert_eq!(hdu.data, ImageData::U16(mask));
    }

    #[test]
    fn test_user_structural_keys_are_ignored() {
        let dir = TempDir::new().unwrap();
        let mut header = FitsHeader::new();
        header.set("NAXIS1", 999i64);
        header.set("BITPIX", 8i64);
        let hdu = Hdu::new(header, ImageData::F64(Array2::ones((2, 3))));
        let path = write(&dir, "grid.fits", &[hdu]);

        let hdu = read(&path, HduName::Primary, &["NAXIS1", "BITPIX"]).unwrap();
        assert_eq!(hdu.header.get_int("NAXIS1"), Some(3));
        assert_eq!(hdu.header.get_int("BITPIX"), Some(-64));
    }

    #[test]
    fn test_header_only_primary() {
        let dir = TempDir::new().unwrap();
        let hdus = vec![
            Hdu::new(FitsHeader::new(), ImageData::Empty),
            Hdu::named("IMAGE", FitsHeader::new(), ImageData::F32(Array2::ones((2, 3)))),
        ];
        let path = write(&dir, "ext.fits", &hdus);

        assert_eq!(read(&path, HduName::Primary, &[]).unwrap().data, ImageData::Empty);
        let image = read(&path, HduName::Extension("IMAGE"), &[]).unwrap();
        assert_eq!(image.data.shape(), Some((2, 3)));
    }

    #[test]
    fn test_string_values_round_trip_exactly() {
        let dir = TempDir::new().unwrap();
        let long = format!("/global/cfs/cdirs/desi/spectro/redux/{}/preproc.fits", "x".repeat(150));
        let values = ["  leading blanks.fits", "it's o''clock.fits", long.as_str()];
        let mut header = FitsHeader::new();
        for (i, value) in values.iter().enumerate() {
            header.set(&format!("INPUT{i:03}"), *value);
        }
        let path = write(&dir, "strings.fits", &[Hdu::new(header, ImageData::Empty)]);

        let hdu = read(&path, HduName::Primary, &["INPUT000", "INPUT001", "INPUT002"]).unwrap();
        for (i, value) in values.iter().enumerate() {
            assert_eq!(hdu.header.get_str(&format!("INPUT{i:03}")), Some(*value));
        }
    }

    #[test]
    fn test_trailing_blanks_rejected() {
        let dir = TempDir::new().unwrap();
        let mut header = FitsHeader::new();
        header.set("INPUT000", "a.fits ");
        let hdus = [Hdu::new(header, ImageData::Empty)];
        let result = FitsioWriter.write_hdus(&hdus, &dir.path().join("x.fits"));
        assert!(matches!(result, Err(CalibError::EncodeError(_))));
    }

    #[test]
    fn test_existing_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let first = Hdu::new(FitsHeader::new(), ImageData::F32(Array2::zeros((2, 2))));
        let second = Hdu::new(FitsHeader::new(), ImageData::F32(Array2::ones((3, 1))));
        write(&dir, "grid.fits", &[first]);
        let path = write(&dir, "grid.fits", &[second.clone()]);
        assert_eq!(read(&path, HduName::Primary, &[]).unwrap().data, second.data);
    }

    #[test]
    fn test_gzip_compressed_input() {
        let dir = TempDir::new().unwrap();
        let (hdus, image, _) = preproc_hdus();
        let plain = write(&dir, "preproc.fits", &hdus);

        let gz = dir.path().join("preproc.fits.gz");
        let file = File::create(&gz).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        std::io::copy(&mut File::open(&plain).unwrap(), &mut encoder).unwrap();
        encoder.finish().unwrap();

        let hdu = read(&gz, HduName::Extension("IMAGE"), &["CCDSECA"]).unwrap();
        assert_eq!(hdu.data, ImageData::F32(image));
        assert_eq!(hdu.header.get_str("CCDSECA"), Some("[1:2,1:2]"));
    }

    #[test]
    fn test_scaled_integer_image() {
        // BITPIX 16 with a signed offset decodes through BSCALE/BZERO
        let dir = TempDir::new().unwrap();
        let data: Vec<u8> = [4i16, -2].iter().flat_map(|v| v.to_be_bytes()).collect();
        let path = write_raw(
            &dir,
            "scaled.fits",
            &[
                "SIMPLE  =                    T",
                "BITPIX  =                   16",
                "NAXIS   =                    2",
                "NAXIS1  =                    2",
                "NAXIS2  =                    1",
                "BSCALE  =                  0.5",
                "BZERO   =                 10.0",
            ],
            &data,
        );

        let hdu = read(&path, HduName::Primary, &[]).unwrap();
        assert_eq!(hdu.data.to_f64(), Some(array![[12.0, 9.0]]));
    }

    #[test]
    fn test_oversized_axes_are_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_raw(
            &dir,
            "huge.fits",
            &[
                "SIMPLE  =                    T",
                "BITPIX  =                  -32",
                "NAXIS   =                    2",
                "NAXIS1  =           4294967296",
                "NAXIS2  =           4294967296",
            ],
            &[],
        );

        let result = FitsioReader.read_hdu(&path, HduName::Primary, &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_not_fits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.fits");
        std::fs::write(&path, "not a fits file").unwrap();

        let result = FitsioReader.read_hdu(&path, HduName::Primary, &[]);
        assert!(matches!(result, Err(CalibError::InputReadError(_))));
    }

    #[test]
    fn test_empty_write_rejected() {
        let dir = TempDir::new().unwrap();
        let result = FitsioWriter.write_hdus(&[], &dir.path().join("empty.fits"));
        assert!(matches!(result, Err(CalibError::EncodeError(_))));
    }
}
