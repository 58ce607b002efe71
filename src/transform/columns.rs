//! Applying the scalar catalog to whole `DataFrame` columns.

use crate::transform::error::TransformError;
use crate::transform::scalar;
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;

/// A per-value transform from [`crate::transform::scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Floatize,
    Intize,
    /// Renders any column as text.
    ToText,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    MonthText,
    DatePart,
    TimePart,
    HourOfDatetime,
    HourOfDatehour,
    DropSeconds,
    YearMonth,
    Floor30Min,
    Floor10Min,
    DateSeason,
    CleanDay,
    /// Season code of an integer month column.
    Season,
    ClassifyPm10,
    ClassifyPm25,
    Joule,
    FormatDatetime,
    /// Shifts a datetime column by +9 h, keeping it a datetime.
    UtcToKst,
    UtcToKstString,
}

/// How [`ColumnOp::JoinDateTime`] joins a date and a time column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// `YYYY-MM-DD HH`
    Hour,
    /// `YYYY-MM-DD HH:MM`
    Minute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowReducer {
    Sum,
    Avg,
    Max,
    Min,
}

impl RowReducer {
    fn reduce(self, values: &[f64]) -> Option<f64> {
        match self {
            RowReducer::Sum => Some(scalar::row_sum(values)),
            RowReducer::Avg => scalar::row_avg(values),
            RowReducer::Max => scalar::row_max(values),
            RowReducer::Min => scalar::row_min(values),
        }
    }
}

/// One column-level step. The output column replaces an existing column of
/// the same name or is appended.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnOp {
    Map {
        transform: Transform,
        input: String,
        output: String,
    },
    JoinDateTime {
        date: String,
        time: String,
        output: String,
        granularity: Granularity,
    },
    Reduce {
        reducer: RowReducer,
        inputs: Vec<String>,
        output: String,
    },
}

impl ColumnOp {
    pub fn map(transform: Transform, input: impl Into<String>, output: impl Into<String>) -> Self {
        ColumnOp::Map {
            transform,
            input: input.into(),
            output: output.into(),
        }
    }

    pub fn join_date_time(
        date: impl Into<String>,
        time: impl Into<String>,
        output: impl Into<String>,
        granularity: Granularity,
    ) -> Self {
        ColumnOp::JoinDateTime {
            date: date.into(),
            time: time.into(),
            output: output.into(),
            granularity,
        }
    }

    pub fn reduce<I, S>(reducer: RowReducer, inputs: I, output: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnOp::Reduce {
            reducer,
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: output.into(),
        }
    }
}

pub trait FrameTransformExt: Sized {
    /// Applies one [`ColumnOp`]. Null inputs give null outputs; values the
    /// catalog cannot parse become null as well.
    fn apply_op(self, op: &ColumnOp) -> Result<Self, TransformError>;

    /// Applies `ops` in order, so later steps can read earlier outputs.
    fn apply_ops(self, ops: &[ColumnOp]) -> Result<Self, TransformError> {
        ops.iter().try_fold(self, |frame, op| frame.apply_op(op))
    }
}

impl FrameTransformExt for DataFrame {
    fn apply_op(mut self, op: &ColumnOp) -> Result<Self, TransformError> {
        let series = match op {
            ColumnOp::Map {
                transform,
                input,
                output,
            } => map_column(&self, *transform, input)?.with_name(output.as_str().into()),
            ColumnOp::JoinDateTime {
                date,
                time,
                output,
                granularity,
            } => join_date_time(&self, date, time, *granularity)?.with_name(output.as_str().into()),
            ColumnOp::Reduce {
                reducer,
                inputs,
                output,
            } => reduce_rows(&self, *reducer, inputs)?.with_name(output.as_str().into()),
        };
        self.with_column(series)?;
        Ok(self)
    }
}

fn text_column(df: &DataFrame, name: &str) -> PolarsResult<Column> {
    df.column(name)?.cast(&DataType::String)
}

fn float_column(df: &DataFrame, name: &str) -> PolarsResult<Column> {
    df.column(name)?.cast(&DataType::Float64)
}

fn map_text_to_int(column: &Column, f: impl Fn(&str) -> Option<i32>) -> PolarsResult<Series> {
    let out: Int32Chunked = column.str()?.into_iter().map(|v| v.and_then(&f)).collect();
    Ok(out.into_series())
}

fn map_text_to_text(column: &Column, f: impl Fn(&str) -> Option<String>) -> PolarsResult<Series> {
    let out: StringChunked = column.str()?.into_iter().map(|v| v.and_then(&f)).collect();
    Ok(out.into_series())
}

fn map_float_to_int(column: &Column, f: impl Fn(f64) -> i32) -> PolarsResult<Series> {
    let out: Int32Chunked = column.f64()?.into_iter().map(|v| v.map(&f)).collect();
    Ok(out.into_series())
}

fn map_column(df: &DataFrame, transform: Transform, input: &str) -> Result<Series, TransformError> {
    let series = match transform {
        Transform::Floatize => {
            let text = text_column(df, input)?;
            let out: Float64Chunked = text
                .str()?
                .into_iter()
                .map(|v| v.and_then(scalar::floatize))
                .collect();
            out.into_series()
        }
        Transform::Intize => intize_column(df, input)?,
        Transform::ToText => text_column(df, input)?.as_materialized_series().clone(),
        Transform::Year => map_text_to_int(&text_column(df, input)?, scalar::year_of)?,
        Transform::Month => map_text_to_int(&text_column(df, input)?, scalar::month_of)?,
        Transform::Day => map_text_to_int(&text_column(df, input)?, scalar::day_of)?,
        Transform::Hour => map_text_to_int(&text_column(df, input)?, scalar::hour_of)?,
        Transform::Minute => map_text_to_int(&text_column(df, input)?, scalar::minute_of)?,
        Transform::HourOfDatetime => map_text_to_int(&text_column(df, input)?, scalar::hour_of_datetime)?,
        Transform::HourOfDatehour => map_text_to_int(&text_column(df, input)?, scalar::hour_of_datehour)?,
        Transform::DateSeason => map_text_to_int(&text_column(df, input)?, scalar::date_season)?,
        Transform::CleanDay => map_text_to_int(&text_column(df, input)?, |d| {
            Some(scalar::is_clean_day(d) as i32)
        })?,
        Transform::MonthText => map_text_to_text(&text_column(df, input)?, |v| scalar::month_str(v).map(str::to_string))?,
        Transform::DatePart => map_text_to_text(&text_column(df, input)?, |v| scalar::date_part(v).map(str::to_string))?,
        Transform::TimePart => map_text_to_text(&text_column(df, input)?, |v| scalar::time_part(v).map(str::to_string))?,
        Transform::DropSeconds => map_text_to_text(&text_column(df, input)?, |v| Some(scalar::drop_seconds(v).to_string()))?,
        Transform::YearMonth => map_text_to_text(&text_column(df, input)?, |v| Some(scalar::year_month(v).to_string()))?,
        Transform::Floor30Min => map_text_to_text(&text_column(df, input)?, scalar::floor_30min)?,
        Transform::Floor10Min => map_text_to_text(&text_column(df, input)?, scalar::floor_10min)?,
        Transform::Season => {
            let months = df.column(input)?.cast(&DataType::Int64)?;
            let out: Int32Chunked = months
                .i64()?
                .into_iter()
                .map(|v| v.map(scalar::weather_season))
                .collect();
            out.into_series()
        }
        Transform::ClassifyPm10 => map_float_to_int(&float_column(df, input)?, scalar::classify_pm10)?,
        Transform::ClassifyPm25 => map_float_to_int(&float_column(df, input)?, scalar::classify_pm25)?,
        Transform::Joule => {
            let values = float_column(df, input)?;
            let out: Float64Chunked = values
                .f64()?
                .into_iter()
                .map(|v| v.map(scalar::joule))
                .collect();
            out.into_series()
        }
        Transform::FormatDatetime => {
            let out: StringChunked = datetimes(df, input)?
                .into_iter()
                .map(|v| v.map(scalar::format_datetime))
                .collect();
            out.into_series()
        }
        Transform::UtcToKstString => {
            let out: StringChunked = datetimes(df, input)?
                .into_iter()
                .map(|v| v.map(scalar::utc_to_kst_string))
                .collect();
            out.into_series()
        }
        Transform::UtcToKst => {
            let out: Int64Chunked = datetimes(df, input)?
                .into_iter()
                .map(|v| v.map(|dt| scalar::utc_to_kst(dt).and_utc().timestamp_millis()))
                .collect();
            out.into_series()
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
    };
    Ok(series)
}

/// Integers pass through, floats are truncated toward zero (NaN and
/// infinities become null) and text is parsed with [`scalar::intize`].
fn intize_column(df: &DataFrame, input: &str) -> PolarsResult<Series> {
    let column = df.column(input)?;
    let dtype = column.dtype();
    let out: Int64Chunked = if dtype.is_integer() {
        column
            .cast(&DataType::Int64)?
            .i64()?
            .clone()
    } else if dtype.is_float() {
        column
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .collect()
    } else {
        text_column(df, input)?
            .str()?
            .into_iter()
            .map(|v| v.and_then(scalar::intize))
            .collect()
    };
    Ok(out.into_series())
}

/// Reads a datetime, date or `YYYY-MM-DD HH:MM[:SS]` text column as naive
/// datetimes.
fn datetimes(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDateTime>>, TransformError> {
    let column = df.column(name)?;
    let values = match column.dtype() {
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            column
                .cast(&DataType::Int64)?
                .i64()?
                .into_iter()
                .map(|v| v.and_then(|ts| from_timestamp(ts, unit)))
                .collect()
        }
        DataType::Date => column
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|v| v.and_then(|ts| from_timestamp(ts, TimeUnit::Milliseconds)))
            .collect(),
        DataType::String => column
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_datetime))
            .collect(),
        other => {
            return Err(TransformError::UnsupportedType {
                column: name.to_string(),
                dtype: other.clone(),
            })
        }
    };
    Ok(values)
}

fn from_timestamp(ts: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let datetime = match unit {
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(ts)?,
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(ts)?,
        TimeUnit::Nanoseconds => DateTime::from_timestamp_nanos(ts),
    };
    Some(datetime.naive_utc())
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .ok()
}

fn join_date_time(
    df: &DataFrame,
    date: &str,
    time: &str,
    granularity: Granularity,
) -> Result<Series, TransformError> {
    let dates = text_column(df, date)?;
    let times = text_column(df, time)?;
    let out: StringChunked = dates
        .str()?
        .into_iter()
        .zip(times.str()?)
        .map(|pair| match pair {
            (Some(d), Some(t)) => Some(match granularity {
                Granularity::Hour => scalar::date_hour(d, t),
                Granularity::Minute => scalar::date_time(d, t),
            }),
            _ => None,
        })
        .collect();
    Ok(out.into_series())
}

fn reduce_rows(
    df: &DataFrame,
    reducer: RowReducer,
    inputs: &[String],
) -> Result<Series, TransformError> {
    let columns = inputs
        .iter()
        .map(|name| float_column(df, name))
        .collect::<PolarsResult<Vec<_>>>()?;
    let arrays = columns
        .iter()
        .map(|c| c.f64())
        .collect::<PolarsResult<Vec<_>>>()?;

    let mut row = Vec::with_capacity(arrays.len());
    let out: Float64Chunked = (0..df.height())
        .map(|i| {
            row.clear();
            for values in &arrays {
                row.push(values.get(i)?);
            }
            reducer.reduce(&row)
        })
        .collect();
    Ok(out.into_series())
}
