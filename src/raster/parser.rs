use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{line_ending, space0, space1, u32 as u32_parser},
    combinator::{eof, map},
    error::ParseError,
    multi::separated_list0,
    number::complete::double,
    sequence::{preceded, separated_pair, terminated},
    IResult, Parser,
};

use super::{AffineTransform, RasterGrid};


#[derive(thiserror::Error, Debug)]
pub enum AsciiGridError {
    #[error("Missing NCOLS-Header")]
    MissingNColsHeader,

    #[error("Missing NROWS-Header")]
    MissingNRowsHeader,

    #[error("Missing CELLSIZE-Header")]
    MissingCellSizeHeader,

    #[error("Expected either XLLCENTER- & YLLCENTER-Header or XLLCORNER- & YLLCORNER-Header")]
    MissingOrigin,

    #[error("Row {} is too short", .0)]
    RowTooShort(usize),

    #[error("One or more rows are missing")]
    MissingRow,

    #[error("CELLSIZE-Header is <= 0")]
    CellSizeInvalid,

    #[error("Header values do not form a valid transform: {}", .0)]
    Transform(#[from] crate::error::NetworkError),

    #[error("NOM returned an incomplete-error")]
    NomIncomplete,

    #[error("NOM returned an error: {}", .0.description())]
    Nom(nom::error::ErrorKind),
}

impl<I> ParseError<I> for AsciiGridError {
    fn from_error_kind(_: I, kind: nom::error::ErrorKind) -> Self {
        AsciiGridError::Nom(kind)
    }

    fn append(_: I, _: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<AsciiGridError> for nom::Err<AsciiGridError> {
    fn from(e: AsciiGridError) -> Self {
        nom::Err::Failure(e)
    }
}

impl From<nom::Err<AsciiGridError>> for AsciiGridError {
    fn from(e: nom::Err<AsciiGridError>) -> Self {
        match e {
            nom::Err::Incomplete(_) => Self::NomIncomplete,
            nom::Err::Error(grid_err) => grid_err,
            nom::Err::Failure(grid_err) => grid_err,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Origin {
    Center(f64, f64),
    Corner(f64, f64),
}

#[derive(Debug)]
enum GridHeader {
    NCols(usize),
    NRows(usize),
    XLLCenter(f64),
    XLLCorner(f64),
    YLLCenter(f64),
    YLLCorner(f64),
    CellSize(f64),
    NoDataValue(f64),
}

#[derive(Debug)]
struct Header {
    columns: usize,
    rows: usize,
    origin: Origin,
    cell_size: f64,
    no_data_value: f64,
}

/// Reader for ESRI ASCII grids (`.asc`).
#[derive(Debug)]
pub struct AsciiGridParser {}

impl AsciiGridParser {
    fn header_line_factory<'a, O, P>(
        name: &'static str,
        parser: P,
    ) -> impl FnMut(&'a str) -> IResult<&'a str, O, AsciiGridError>
    where
        P: Parser<&'a str, O, AsciiGridError>,
    {
        map(
            terminated(
                separated_pair(tag_no_case(name), space1, parser),
                preceded(space0, line_ending),
            ),
            |(_, val)| val,
        )
    }

    fn header_line(input: &str) -> IResult<&str, GridHeader, AsciiGridError> {
        alt((
            map(
                AsciiGridParser::header_line_factory("NCOLS", u32_parser),
                |val| GridHeader::NCols(val as usize),
            ),
            map(
                AsciiGridParser::header_line_factory("NROWS", u32_parser),
                |val| GridHeader::NRows(val as usize),
            ),
            map(
                AsciiGridParser::header_line_factory("XLLCENTER", double),
                GridHeader::XLLCenter,
            ),
            map(
                AsciiGridParser::header_line_factory("XLLCORNER", double),
                GridHeader::XLLCorner,
            ),
            map(
                AsciiGridParser::header_line_factory("YLLCENTER", double),
                GridHeader::YLLCenter,
            ),
            map(
                AsciiGridParser::header_line_factory("YLLCORNER", double),
                GridHeader::YLLCorner,
            ),
            map(
                AsciiGridParser::header_line_factory("CELLSIZE", double),
                GridHeader::CellSize,
            ),
            map(
                AsciiGridParser::header_line_factory("NODATA_VALUE", double),
                GridHeader::NoDataValue,
            ),
        ))(input)
    }

    fn data_line(input: &str) -> IResult<&str, Vec<f64>, AsciiGridError> {
        terminated(
            preceded(space0, separated_list0(space1, double)),
            preceded(space0, alt((line_ending, eof))),
        )(input)
    }

    fn header(mut input: &str) -> IResult<&str, Header, AsciiGridError> {
        let mut columns: Option<usize> = None;
        let mut rows: Option<usize> = None;
        let mut x_center: Option<f64> = None;
        let mut y_center: Option<f64> = None;
        let mut x_corner: Option<f64> = None;
        let mut y_corner: Option<f64> = None;
        let mut cell_size: Option<f64> = None;
        let mut no_data_value: Option<f64> = None;

        loop {
            match AsciiGridParser::header_line(input) {
                Err(nom::Err::Error(_)) => break, // first data line
                Err(err) => return Err(err),
                Ok((remaining_input, header)) => {
                    input = remaining_input;

                    match header {
                        GridHeader::NCols(val) => columns = Some(val),
                        GridHeader::NRows(val) => rows = Some(val),
                        GridHeader::XLLCenter(val) => x_center = Some(val),
                        GridHeader::XLLCorner(val) => x_corner = Some(val),
                        GridHeader::YLLCenter(val) => y_center = Some(val),
                        GridHeader::YLLCorner(val) => y_corner = Some(val),
                        GridHeader::CellSize(val) => cell_size = Some(val),
                        GridHeader::NoDataValue(val) => no_data_value = Some(val),
                    }
                }
            }
        }

        let columns = columns.ok_or(AsciiGridError::MissingNColsHeader)?;
        let rows = rows.ok_or(AsciiGridError::MissingNRowsHeader)?;
        let cell_size = cell_size.ok_or(AsciiGridError::MissingCellSizeHeader)?;

        if cell_size <= 0.0 {
            return Err(AsciiGridError::CellSizeInvalid.into());
        }

        let origin = match (x_center, y_center, x_corner, y_corner) {
            (Some(x), Some(y), _, _) => Origin::Center(x, y),
            (_, _, Some(x), Some(y)) => Origin::Corner(x, y),
            _ => return Err(AsciiGridError::MissingOrigin.into()),
        };

        Ok((
            input,
            Header {
                columns,
                rows,
                origin,
                cell_size,
                no_data_value: no_data_value.unwrap_or(-9999.0),
            },
        ))
    }

    fn transform(header: &Header) -> Result<AffineTransform, AsciiGridError> {
        let (left, bottom) = match header.origin {
            Origin::Center(x, y) => (x - header.cell_size / 2.0, y - header.cell_size / 2.0),
            Origin::Corner(x, y) => (x, y),
        };
        let top = bottom + header.cell_size * header.rows as f64;

        Ok(AffineTransform::north_up(
            left,
            header.cell_size,
            top,
            -header.cell_size,
        )?)
    }

    pub fn parse(i: &str) -> Result<RasterGrid, AsciiGridError> {
        let (mut input, header) = AsciiGridParser::header(i)?;
        let transform = AsciiGridParser::transform(&header)?;

        // grown per row read, headers may overstate the grid
        let mut data: Vec<f64> = Vec::new();

        for row_index in 0..header.rows {
            if input.is_empty() {
                return Err(AsciiGridError::MissingRow);
            }

            let (remaining_input, mut values) = AsciiGridParser::data_line(input)?;
            input = remaining_input;

            if values.len() < header.columns {
                return Err(AsciiGridError::RowTooShort(row_index));
            }

            values.truncate(header.columns);
            data.extend(values.into_iter().map(|v| {
                if v == header.no_data_value {
                    f64::NAN
                } else {
                    v
                }
            }));
        }

        Ok(RasterGrid::new(header.columns, header.rows, transform, data))
    }
}
