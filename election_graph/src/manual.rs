/*!

This is the long-form manual for `election_graph` and `txresults`.

## Inputs

A snapshot is made of three JSON documents and an optional CSV file.

### Version header

```json
{"___versionNo": 12, "___electionId": 47009, "elecDate": "11082022"}
```

The election date may also be written `2022-11-08`.

### County results

An object with one entry per county, or an array of counties. Each county lists
its races and, for each race, its candidates:

| field     | scope     | meaning                                   |
|-----------|-----------|-------------------------------------------|
| `N`       | county    | county name (required)                    |
| `C`       | county    | color                                     |
| `TV`      | county    | registered voters (defaults to `RV`)      |
| `Summary` | county    | county summary block (required)           |
| `OID`     | race      | race id                                   |
| `ON`      | race      | office name (`N` is accepted too)         |
| `T`       | race      | total votes                               |
| `O`       | race      | ballot order                              |
| `PR`      | race      | precincts reporting                       |
| `OTRV`    | race      | registered voters                         |
| `TPR`     | race      | total precincts                           |
| `id`      | candidate | candidate id                              |
| `N`       | candidate | name, with `(I)` for incumbents           |
| `P`       | candidate | party code (`REP`, `DEM`, `LIB`, ...)     |
| `V`       | candidate | total votes                               |
| `EV`      | candidate | early votes (default 0)                   |
| `PE`      | candidate | percent (default 0)                       |

The summary block carries `PRR`, `PRP`, `P`, `RV`, `VC`, `VT`, `NPL`, `PLR` and
`PLP`: precincts reporting, total precincts, percent reporting, registered voters,
votes counted, turnout, polling locations, polling locations reporting and
percent of polling locations reporting. All of them are optional.

Numbers may be given as JSON numbers or as strings.

### Statewide offices

`{"OS": [...]}` or a bare array. Each office has `OID`, `ON` and a list `C` of
candidates with `N`, `P`, `T` (total votes) and `O` (ballot order).

Statewide candidates are linked to the race candidate with the same name. When
several race candidates share that name, the first one in race order is used
and the run reports the ambiguity.

### Endorsements

A CSV file with the columns `District Type`, `District Number`,
`Candidate First Name`, `Candidate Last Name`, followed by one
`<Organization> Endorsed` column per endorser, holding `TRUE`, `FALSE` or nothing.

## Configuration

```json
{
  "electionId": "47009",
  "outputDirectory": "out",
  "writeCrosstab": true,
  "sources": {
    "versionFile": "version.json",
    "countyFile": "counties.json",
    "officeFile": "offices.json",
    "endorsementsFile": "endorsements.csv"
  },
  "urls": {
    "resultVersionUrl": "https://results.example.org/{electionId}/version.json",
    "countyUrl": "https://results.example.org/{electionId}/{versionNo}/county.json",
    "officeUrl": "https://results.example.org/{electionId}/{versionNo}/office.json"
  }
}
```

Relative paths are resolved against the directory of the configuration file.
Command-line flags override the configuration.

## Outputs

All the outputs share the stem `tx-{electionId}-{versionNo}`:

* `.json` the full result graph
* `-race-results.csv` one row per race, candidate and county
* `-county-results.csv` one row per county
* `-statewide-results.csv` one row per statewide candidate and county
* `-statewide-rollup.csv` one row per statewide candidate, summed over the counties
* `-crosstab.csv` (optional) total votes per statewide candidate and county

## Office types

Office names are classified by the first matching rule:

| office name contains                          | office type                | district                  |
|-----------------------------------------------|----------------------------|---------------------------|
| `PRESIDENT`                                   | `POTUS`                    |                           |
| `U. S. SENATOR`                               | `US SENATE`                |                           |
| `U. S. REPRESENTATIVE`                        | `CD`                       | district number           |
| `LIEUTENANT GOVERNOR`                         | `LT GOVERNOR`              |                           |
| `GOVERNOR`                                    | `GOVERNOR`                 |                           |
| `ATTORNEY GENERAL`                            | `ATTORNEY GENERAL`         |                           |
| `COMPTROLLER`                                 | `COMPTROLLER`              |                           |
| `GENERAL LAND OFFICE`                         | `LAND COMMISSIONER`        |                           |
| `COMMISSIONER OF AGRICULTURE`                 | `AGRICULTURE COMMISSIONER` |                           |
| `RAILROAD COMMISSIONER`                       | `RRC`                      |                           |
| `STATE SENATOR`                               | `SD`                       | district number           |
| `STATE REPRESENTATIVE`                        | `HD`                       | district number           |
| `STATE BOARD OF EDUCATION`                    | `SBOE`                     | after the last comma      |
| `COURT OF CRIMINAL APPEALS` and `PRESIDING`   | `PRESIDING JUDGE CCA`      |                           |
| `COURT OF CRIMINAL APPEALS`                   | `CCA`                      | `PLACE n`                 |
| `SUPREME COURT` and `CHIEF JUSTICE`           | `SCOTX CHIEF JUSTICE`      |                           |
| `SUPREME COURT`                               | `SCOTX`                    | `PLACE n`                 |
| `COURT OF APPEALS` and `CHIEF JUSTICE`        | `COA CHIEF JUSTICE`        | court ordinal             |
| `COURT OF APPEALS`                            | `COA`                      | court ordinal and place   |
| `CRIMINAL DISTRICT ATTORNEY`                  | `CRIMINAL DISTRICT ATTORNEY` | county                  |
| `DISTRICT ATTORNEY`                           | `DISTRICT ATTORNEY`        | judicial district or county |
| starts with `CRIMINAL DISTRICT JUDGE`         | `CRIMINAL DISTRICT JUDGE`  | after the last comma      |
| starts with `DISTRICT JUDGE`                  | `DISTRICT JUDGE`           | after the last comma      |
| `JUDICIAL DISTRICT`                           | `DISTRICT JUDGE`           | the judicial district     |
| `MULTICOUNTY COURT AT LAW`                    | `MULTICOUNTY COURT AT LAW` | county                    |

Anything else is classified as `Other`, with no district.
*/
